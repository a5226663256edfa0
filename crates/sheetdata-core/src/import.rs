//! Options and results shared by the workbook walkers

/// A worksheet listed in a workbook
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetInfo {
    /// Position in the workbook's sheet list
    pub index: usize,
    pub name: String,
}

/// Which worksheets a walker decodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SheetSelector {
    /// Every worksheet
    #[default]
    All,
    /// The sheet at this position
    Index(usize),
    /// The first sheet with this name (case-insensitive)
    Name(String),
}

/// Walker configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportOptions {
    pub sheets: SheetSelector,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only decode the sheet at `index`
    pub fn sheet_index(mut self, index: usize) -> Self {
        self.sheets = SheetSelector::Index(index);
        self
    }

    /// Only decode the sheet called `name`
    pub fn sheet_name<S: Into<String>>(mut self, name: S) -> Self {
        self.sheets = SheetSelector::Name(name.into());
        self
    }

    /// Whether the sheet should be decoded
    pub fn selects(&self, sheet: &SheetInfo) -> bool {
        match &self.sheets {
            SheetSelector::All => true,
            SheetSelector::Index(index) => *index == sheet.index,
            SheetSelector::Name(name) => name.eq_ignore_ascii_case(&sheet.name),
        }
    }
}

/// One decoded worksheet together with the sink that received it
#[derive(Debug, Clone)]
pub struct ImportedSheet<S> {
    pub info: SheetInfo,
    pub data: S,
}
