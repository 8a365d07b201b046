//! Weather alert model

use serde::{Deserialize, Serialize};

/// A weather alert bulletin, kept as the free-text fields the alert API sends.
///
/// Field roles: `t1` headline, `t2` affected region, `t3` effective time,
/// `t4` detail, `t5` status time, `t6` preliminary notices, `t7` remarks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub t1: Option<String>,
    pub t2: Option<String>,
    pub t3: Option<String>,
    pub t4: Option<String>,
    pub t5: Option<String>,
    pub t6: Option<String>,
    pub t7: Option<String>,
}

impl AlertRecord {
    /// All text fields in order, missing ones as empty strings
    #[must_use]
    pub fn fields(&self) -> [&str; 7] {
        [
            self.t1.as_deref().unwrap_or(""),
            self.t2.as_deref().unwrap_or(""),
            self.t3.as_deref().unwrap_or(""),
            self.t4.as_deref().unwrap_or(""),
            self.t5.as_deref().unwrap_or(""),
            self.t6.as_deref().unwrap_or(""),
            self.t7.as_deref().unwrap_or(""),
        ]
    }

    /// Concatenation of all text fields
    #[must_use]
    pub fn text(&self) -> String {
        self.fields().concat()
    }

    #[must_use]
    pub fn headline(&self) -> &str {
        self.t1.as_deref().unwrap_or("").trim()
    }

    #[must_use]
    pub fn region(&self) -> &str {
        self.t2.as_deref().unwrap_or("").trim()
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        self.t4.as_deref().unwrap_or("").trim()
    }
}
