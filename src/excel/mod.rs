mod cell;
mod defined_name;
mod package;
mod sheet;
mod workbook;

pub use cell::{Cell, CellValue};
pub use defined_name::DefinedName;
pub use package::{
    PackageLayout, SheetLayout, SheetNumberFormats, read_number_formats, read_package_layout,
};
pub use sheet::{ColumnLayout, MAX_RANGE_CELLS, MAX_ROWS, Sheet, SheetVisibility};
pub use workbook::{Workbook, open_workbook};
