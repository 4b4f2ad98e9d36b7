use rust_xlsxwriter::utility::quote_sheet_name;

/// A workbook- or sheet-scoped name such as `GrowthRate`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinedName {
    pub name: String,
    /// Sheet the name is local to; `None` for workbook scope
    pub scope: Option<String>,
    /// What the name refers to, without a leading `=`
    pub formula: String,
}

impl DefinedName {
    pub fn global(name: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: None,
            formula: formula.into(),
        }
    }

    /// The name in `Sheet!Name` form for local names, quoting the sheet
    /// where Excel requires it.
    pub fn qualified_name(&self) -> String {
        match &self.scope {
            Some(sheet) => format!("{}!{}", quote_sheet_name(sheet), self.name),
            None => self.name.clone(),
        }
    }
}
