#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

pub mod diagnostic_codes {
    pub const IDENTIFIER_EXPECTED: u32 = 1003;
    pub const TOKEN_EXPECTED: u32 = 1005;
    pub const UNTERMINATED_STRING_LITERAL: u32 = 1002;
    pub const INVALID_CHARACTER: u32 = 1127;
    pub const DECLARATION_OR_STATEMENT_EXPECTED: u32 = 1128;
    pub const EXPRESSION_EXPECTED: u32 = 1109;
    pub const UNTERMINATED_TEMPLATE_LITERAL: u32 = 1160;
    pub const TYPE_EXPECTED: u32 = 1110;
    pub const THIS_MAY_BE_CONVERTED_TO_AN_ASYNC_FUNCTION: u32 = 80006;
    pub const CONVERT_TO_ASYNC_FUNCTION: u32 = 95065;
    pub const CONVERT_ALL_TO_ASYNC_FUNCTIONS: u32 = 95066;
}

pub mod diagnostic_messages {
    use super::{DiagnosticCategory, DiagnosticMessage, diagnostic_codes};

    pub const IDENTIFIER_EXPECTED: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::IDENTIFIER_EXPECTED,
        category: DiagnosticCategory::Error,
        message: "Identifier expected.",
    };
    pub const TOKEN_EXPECTED: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::TOKEN_EXPECTED,
        category: DiagnosticCategory::Error,
        message: "'{0}' expected.",
    };
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::UNTERMINATED_STRING_LITERAL,
        category: DiagnosticCategory::Error,
        message: "Unterminated string literal.",
    };
    pub const INVALID_CHARACTER: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::INVALID_CHARACTER,
        category: DiagnosticCategory::Error,
        message: "Invalid character.",
    };
    pub const DECLARATION_OR_STATEMENT_EXPECTED: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::DECLARATION_OR_STATEMENT_EXPECTED,
        category: DiagnosticCategory::Error,
        message: "Declaration or statement expected.",
    };
    pub const EXPRESSION_EXPECTED: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::EXPRESSION_EXPECTED,
        category: DiagnosticCategory::Error,
        message: "Expression expected.",
    };
    pub const UNTERMINATED_TEMPLATE_LITERAL: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::UNTERMINATED_TEMPLATE_LITERAL,
        category: DiagnosticCategory::Error,
        message: "Unterminated template literal.",
    };
    pub const TYPE_EXPECTED: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::TYPE_EXPECTED,
        category: DiagnosticCategory::Error,
        message: "Type expected.",
    };
    pub const THIS_MAY_BE_CONVERTED_TO_AN_ASYNC_FUNCTION: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::THIS_MAY_BE_CONVERTED_TO_AN_ASYNC_FUNCTION,
        category: DiagnosticCategory::Suggestion,
        message: "This may be converted to an async function.",
    };
    pub const CONVERT_TO_ASYNC_FUNCTION: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::CONVERT_TO_ASYNC_FUNCTION,
        category: DiagnosticCategory::Message,
        message: "Convert to async function",
    };
    pub const CONVERT_ALL_TO_ASYNC_FUNCTIONS: DiagnosticMessage = DiagnosticMessage {
        code: diagnostic_codes::CONVERT_ALL_TO_ASYNC_FUNCTIONS,
        category: DiagnosticCategory::Message,
        message: "Convert all to async functions",
    };
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
}

impl Diagnostic {
    pub fn error(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            message_text: message.into(),
            code,
            file: file.into(),
            start,
            length,
        }
    }

    pub fn from_message(
        file: impl Into<String>,
        start: u32,
        length: u32,
        message: &DiagnosticMessage,
    ) -> Self {
        Self {
            category: message.category,
            message_text: message.message.to_string(),
            code: message.code,
            file: file.into(),
            start,
            length,
        }
    }
}

pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}
