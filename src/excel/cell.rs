use calamine::Data;

#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    /// Date serial number; written back as a number with a date format
    DateTime(f64),
    /// Error literal such as `#DIV/0!`, kept as text
    Error(String),
    /// Formula text including the leading `=`
    Formula(String),
}

impl CellValue {
    /// Interprets user input: a leading `=` makes a formula, anything else is text.
    pub fn from_input(input: &str) -> Self {
        if input.is_empty() {
            CellValue::Empty
        } else if input.starts_with('=') {
            CellValue::Formula(input.to_string())
        } else {
            CellValue::Text(input.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Formula text, if this value is a formula.
    pub fn formula(&self) -> Option<&str> {
        match self {
            CellValue::Formula(formula) => Some(formula),
            _ => None,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) if s.is_empty() => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Boolean(*b),
            Data::Error(e) => CellValue::Error(e.to_string()),
            Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }
}

/// A cell's value plus the number format applied to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub number_format: Option<String>,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            number_format: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(CellValue::Empty)
    }

    pub fn with_number_format(mut self, number_format: impl Into<String>) -> Self {
        self.number_format = Some(number_format.into());
        self
    }

    pub fn is_formula(&self) -> bool {
        matches!(self.value, CellValue::Formula(_))
    }

    /// No value and no format: nothing would be written for this cell.
    pub fn is_blank(&self) -> bool {
        self.value.is_empty() && self.number_format.is_none()
    }
}
