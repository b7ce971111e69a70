//! Source and target document formats handled by the service.

/// A document format identified by its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentFormat {
    /// Extension without the leading dot, lowercase.
    pub extension: &'static str,
    /// MIME type served for files of this format.
    pub content_type: &'static str,
}

impl DocumentFormat {
    /// Whether `filename` ends with `.{extension}`, ignoring ASCII case.
    pub fn matches(&self, filename: &str) -> bool {
        let Some((_, ext)) = filename.rsplit_once('.') else {
            return false;
        };
        ext.eq_ignore_ascii_case(self.extension)
    }
}

/// Office Open XML word-processing document.
pub const DOCX: DocumentFormat = DocumentFormat {
    extension: "docx",
    content_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
};

/// Portable Document Format.
pub const PDF: DocumentFormat = DocumentFormat {
    extension: "pdf",
    content_type: "application/pdf",
};

/// Format accepted on upload.
pub const SOURCE_FORMAT: DocumentFormat = DOCX;

/// Format produced by conversion and served on download.
pub const TARGET_FORMAT: DocumentFormat = PDF;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_is_case_insensitive() {
        assert!(DOCX.matches("report.docx"));
        assert!(DOCX.matches("REPORT.DOCX"));
        assert!(DOCX.matches("archive.tar.Docx"));
    }

    #[test]
    fn matches_rejects_other_extensions() {
        assert!(!DOCX.matches("report.txt"));
        assert!(!DOCX.matches("report.doc"));
        assert!(!DOCX.matches("docx"));
        assert!(!DOCX.matches("report.docx.exe"));
        assert!(!DOCX.matches(""));
    }
}
