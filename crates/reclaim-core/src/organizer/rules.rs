/// Classification rules for the organizer.
///
/// Rules are evaluated in order and the first match wins. Order matters
/// because the buckets overlap: a bank statement saved as PDF must land with
/// the financial documents, not the generic documents.
use crate::analysis::file_types::{categorise_extension, FileCategory};
use regex::{RegexSet, RegexSetBuilder};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Destination bucket, as a `/`-separated path relative to the organizer root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub const FINANCIAL: &'static str = "Importantes/Financeiros";
    pub const MEMES: &'static str = "Lixo_Liberar/Memes";
    pub const IMPORTANT_DOCUMENTS: &'static str = "Importantes/Documentos";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Catch-all bucket for anything no rule claimed.
    pub fn catch_all() -> Self {
        Self::new(FileCategory::Other.folder_name())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Relative directory for this bucket, built component by component so
    /// the separator is correct on every platform.
    pub fn relative_dir(&self) -> PathBuf {
        self.0.split('/').filter(|c| !c.is_empty()).collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<FileCategory> for Category {
    fn from(cat: FileCategory) -> Self {
        Self::new(cat.folder_name())
    }
}

/// One step of the classification chain.
pub trait ClassificationRule: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// `file_name` is the final path component; `extension` is lowercased and
    /// dotted (`".pdf"`) or empty.
    fn classify(&self, file_name: &str, extension: &str) -> Option<Category>;
}

/// Matches the file name against any of a set of case-insensitive patterns.
pub struct PatternRule {
    name: String,
    patterns: RegexSet,
    category: Category,
}

impl PatternRule {
    pub fn new<I, S>(name: &str, patterns: I, category: Category) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = RegexSetBuilder::new(patterns)
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            name: name.to_string(),
            patterns,
            category,
        })
    }
}

impl ClassificationRule for PatternRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, file_name: &str, _extension: &str) -> Option<Category> {
        self.patterns
            .is_match(file_name)
            .then(|| self.category.clone())
    }
}

/// Matches a fixed set of extensions (given without the dot).
pub struct ExtensionSetRule {
    name: String,
    extensions: Vec<String>,
    category: Category,
}

impl ExtensionSetRule {
    pub fn new(name: &str, extensions: &[&str], category: Category) -> Self {
        Self {
            name: name.to_string(),
            extensions: extensions.iter().map(|e| e.to_ascii_lowercase()).collect(),
            category,
        }
    }
}

impl ClassificationRule for ExtensionSetRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, _file_name: &str, extension: &str) -> Option<Category> {
        let bare = extension.strip_prefix('.')?;
        self.extensions
            .iter()
            .any(|e| e == bare)
            .then(|| self.category.clone())
    }
}

/// Static extension table; always matches, falling back to the catch-all.
pub struct ExtensionTableRule;

impl ClassificationRule for ExtensionTableRule {
    fn name(&self) -> &str {
        "extension-table"
    }

    fn classify(&self, _file_name: &str, extension: &str) -> Option<Category> {
        Some(categorise_extension(extension).into())
    }
}

/// Statements, bank slips, invoices, fiscal notes, receipts.
pub const FINANCIAL_PATTERNS: &[&str] = &[
    "extrato",
    "boleto",
    "fatura",
    r"(?:^|[^a-z])nfs?-?e?(?:[^a-z]|$)",
    r"nota.?fiscal",
    "recibo",
    "statement",
    "invoice",
    "receipt",
];

/// Chat-export image naming conventions and the obvious keyword.
pub const MEME_PATTERNS: &[&str] = &[r"whatsapp.*image", r"img-\d{8}-wa\d{4}", "meme"];

pub const IMPORTANT_DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// The built-in chain: financial, memes, important documents, extension table.
pub fn default_rules() -> Vec<Box<dyn ClassificationRule>> {
    vec![
        Box::new(
            PatternRule::new("financial", FINANCIAL_PATTERNS, Category::new(Category::FINANCIAL))
                .expect("built-in financial patterns are valid"),
        ),
        Box::new(
            PatternRule::new("memes", MEME_PATTERNS, Category::new(Category::MEMES))
                .expect("built-in meme patterns are valid"),
        ),
        Box::new(ExtensionSetRule::new(
            "important-documents",
            IMPORTANT_DOCUMENT_EXTENSIONS,
            Category::new(Category::IMPORTANT_DOCUMENTS),
        )),
        Box::new(ExtensionTableRule),
    ]
}

/// Run `rules` in order; the catch-all applies when none match.
pub fn classify_with(
    rules: &[Box<dyn ClassificationRule>],
    file_name: &str,
    extension: &str,
) -> Category {
    for rule in rules {
        if let Some(category) = rule.classify(file_name, extension) {
            debug!("Rule '{}' filed {file_name} under {category}", rule.name());
            return category;
        }
    }
    Category::catch_all()
}
