use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

/// How much the extractors trust partially filled cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPresence {
    /// First shape match wins; line items may contain empty cells.
    Lenient,
    /// Supplier and payment fields must be non-empty, and line items with any
    /// empty cell are dropped.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountErrorPolicy {
    SkipAndWarn,
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// Supplier and payment fields are prepended to every line item.
    Merged,
    /// Supplier and payment fields are written as leading rows of their own.
    Separate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridFormat {
    Auto,
    Pdf,
    TabulaJson,
}

impl GridFormat {
    #[must_use]
    pub fn resolve(self, input: &Path) -> Self {
        match self {
            Self::Auto => {
                let is_json = input
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
                if is_json { Self::TabulaJson } else { Self::Pdf }
            }
            other => other,
        }
    }
}

impl FromStr for GridFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "pdf" => Ok(Self::Pdf),
            "tabula-json" | "tabula" | "json" => Ok(Self::TabulaJson),
            other => Err(format!(
                "unknown grid format '{other}', expected auto, pdf or tabula-json"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    pages: BTreeSet<u32>,
}

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }
}

fn parse_page(token: &str, what: &str) -> Result<u32, String> {
    let page: u32 = token
        .trim()
        .parse()
        .map_err(|_| format!("invalid {what}: '{}'", token.trim()))?;
    if page == 0 {
        return Err("pages are 1-based".to_string());
    }
    Ok(page)
}

impl FromStr for PageSelection {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut pages = BTreeSet::new();
        for token in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match token.split_once('-') {
                Some((start, end)) => {
                    let start = parse_page(start, "page range start")?;
                    let end = parse_page(end, "page range end")?;
                    if end < start {
                        return Err(format!("invalid range '{token}': end is before start"));
                    }
                    pages.extend(start..=end);
                }
                None => {
                    pages.insert(parse_page(token, "page number")?);
                }
            }
        }

        if pages.is_empty() {
            return Err("page selection cannot be empty".to_string());
        }

        Ok(Self { pages })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub pages: Option<PageSelection>,
    pub format: GridFormat,
    pub field_presence: FieldPresence,
    pub amount_errors: AmountErrorPolicy,
    pub layout: OutputLayout,
    /// Leading rows of every table that are never treated as line items.
    pub header_rows: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            pages: None,
            format: GridFormat::Auto,
            field_presence: FieldPresence::Lenient,
            amount_errors: AmountErrorPolicy::SkipAndWarn,
            layout: OutputLayout::Merged,
            header_rows: 3,
        }
    }
}

impl ExtractOptions {
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.field_presence == FieldPresence::Strict
    }
}
