//! Rich (multi-run) strings

/// One run of text with an optional font index
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextRun {
    pub text: String,
    pub font: Option<u16>,
}

/// An inline or rich string made of formatted runs
///
/// Runs are appended while decoding; [`RichString::finalize`] must be called
/// before the string is handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RichString {
    runs: Vec<TextRun>,
    finalized: bool,
}

impl RichString {
    pub fn new() -> Self {
        Self::default()
    }

    /// A single unformatted run
    pub fn plain<S: Into<String>>(text: S) -> Self {
        let mut rich = Self::new();
        rich.push_run(text, None);
        rich
    }

    /// Append a run
    pub fn push_run<S: Into<String>>(&mut self, text: S, font: Option<u16>) {
        self.runs.push(TextRun {
            text: text.into(),
            font,
        });
        self.finalized = false;
    }

    /// Merge adjacent runs sharing a font and drop empty runs
    pub fn finalize(&mut self) {
        let mut merged: Vec<TextRun> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(prev) if prev.font == run.font => prev.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        self.runs = merged;
        self.finalized = true;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }

    /// Build a finalized string from UTF-16 text and font portions given as
    /// (first code unit, font id).
    ///
    /// Portions may arrive unsorted; positions past the end are clamped.
    /// Text before the first portion is unformatted.
    pub fn from_font_portions(units: &[u16], portions: &[(usize, u16)]) -> Self {
        let mut portions = portions.to_vec();
        portions.sort_by_key(|&(first, _)| first);

        let mut rich = Self::new();
        let head = portions.first().map_or(units.len(), |&(first, _)| first.min(units.len()));
        rich.push_run(String::from_utf16_lossy(&units[..head]), None);
        for (i, &(start, font)) in portions.iter().enumerate() {
            let start = start.min(units.len());
            let end = portions
                .get(i + 1)
                .map_or(units.len(), |&(next, _)| next.min(units.len()));
            if start < end {
                rich.push_run(String::from_utf16_lossy(&units[start..end]), Some(font));
            }
        }
        rich.finalize();
        rich
    }
}
