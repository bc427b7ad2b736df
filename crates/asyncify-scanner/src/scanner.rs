//! Token kinds and keyword tables.

use serde::Serialize;

macro_rules! define_syntax_kinds {
    ($($name:ident),* $(,)?) => {
        /// Token kinds produced by the scanner.
        ///
        /// Values fit in the `kind: u16` slot of a parser node; node kinds
        /// that have no token counterpart live in `syntax_kind_ext` above
        /// the last token value.
        #[repr(u16)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub enum SyntaxKind {
            $($name),*
        }

        impl SyntaxKind {
            const ALL: &'static [SyntaxKind] = &[$(SyntaxKind::$name),*];

            /// Convert a raw `u16` kind back to a token kind.
            /// Returns `None` for node kinds and out-of-range values.
            #[inline]
            pub fn from_u16(value: u16) -> Option<SyntaxKind> {
                Self::ALL.get(value as usize).copied()
            }

            /// Number of token kinds; node kinds start at this value.
            pub const COUNT: u16 = Self::ALL.len() as u16;
        }
    };
}

define_syntax_kinds! {
    Unknown,
    EndOfFileToken,
    // Trivia
    SingleLineCommentTrivia,
    MultiLineCommentTrivia,
    NewLineTrivia,
    WhitespaceTrivia,
    // Literals
    NumericLiteral,
    BigIntLiteral,
    StringLiteral,
    RegularExpressionLiteral,
    NoSubstitutionTemplateLiteral,
    TemplateHead,
    TemplateMiddle,
    TemplateTail,
    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    DotToken,
    DotDotDotToken,
    SemicolonToken,
    CommaToken,
    QuestionDotToken,
    LessThanToken,
    GreaterThanToken,
    LessThanEqualsToken,
    GreaterThanEqualsToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    EqualsEqualsEqualsToken,
    ExclamationEqualsEqualsToken,
    EqualsGreaterThanToken,
    PlusToken,
    MinusToken,
    AsteriskToken,
    AsteriskAsteriskToken,
    SlashToken,
    PercentToken,
    PlusPlusToken,
    MinusMinusToken,
    LessThanLessThanToken,
    GreaterThanGreaterThanToken,
    GreaterThanGreaterThanGreaterThanToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    ExclamationToken,
    TildeToken,
    AmpersandAmpersandToken,
    BarBarToken,
    QuestionToken,
    ColonToken,
    AtToken,
    QuestionQuestionToken,
    // Assignments
    EqualsToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    AsteriskAsteriskEqualsToken,
    SlashEqualsToken,
    PercentEqualsToken,
    LessThanLessThanEqualsToken,
    GreaterThanGreaterThanEqualsToken,
    GreaterThanGreaterThanGreaterThanEqualsToken,
    AmpersandEqualsToken,
    BarEqualsToken,
    CaretEqualsToken,
    BarBarEqualsToken,
    AmpersandAmpersandEqualsToken,
    QuestionQuestionEqualsToken,
    // Identifiers
    Identifier,
    PrivateIdentifier,
    // Reserved words
    BreakKeyword,
    CaseKeyword,
    CatchKeyword,
    ClassKeyword,
    ConstKeyword,
    ContinueKeyword,
    DebuggerKeyword,
    DefaultKeyword,
    DeleteKeyword,
    DoKeyword,
    ElseKeyword,
    EnumKeyword,
    ExportKeyword,
    ExtendsKeyword,
    FalseKeyword,
    FinallyKeyword,
    ForKeyword,
    FunctionKeyword,
    IfKeyword,
    ImportKeyword,
    InKeyword,
    InstanceOfKeyword,
    NewKeyword,
    NullKeyword,
    ReturnKeyword,
    SuperKeyword,
    SwitchKeyword,
    ThisKeyword,
    ThrowKeyword,
    TrueKeyword,
    TryKeyword,
    TypeOfKeyword,
    VarKeyword,
    VoidKeyword,
    WhileKeyword,
    WithKeyword,
    // Contextual keywords
    AbstractKeyword,
    AsKeyword,
    AsyncKeyword,
    AwaitKeyword,
    ConstructorKeyword,
    DeclareKeyword,
    FromKeyword,
    GetKeyword,
    ImplementsKeyword,
    InterfaceKeyword,
    KeyOfKeyword,
    LetKeyword,
    ModuleKeyword,
    NamespaceKeyword,
    OfKeyword,
    OverrideKeyword,
    PrivateKeyword,
    ProtectedKeyword,
    PublicKeyword,
    ReadonlyKeyword,
    SatisfiesKeyword,
    SetKeyword,
    StaticKeyword,
    TypeKeyword,
    YieldKeyword,
}

impl SyntaxKind {
    pub const FIRST_RESERVED_WORD: SyntaxKind = SyntaxKind::BreakKeyword;
    pub const LAST_RESERVED_WORD: SyntaxKind = SyntaxKind::WithKeyword;
    pub const FIRST_CONTEXTUAL_KEYWORD: SyntaxKind = SyntaxKind::AbstractKeyword;
    pub const LAST_CONTEXTUAL_KEYWORD: SyntaxKind = SyntaxKind::YieldKeyword;

    #[inline]
    pub fn is_keyword(self) -> bool {
        self >= Self::FIRST_RESERVED_WORD && self <= Self::LAST_CONTEXTUAL_KEYWORD
    }

    #[inline]
    pub fn is_reserved_word(self) -> bool {
        self >= Self::FIRST_RESERVED_WORD && self <= Self::LAST_RESERVED_WORD
    }

    #[inline]
    pub fn is_contextual_keyword(self) -> bool {
        self >= Self::FIRST_CONTEXTUAL_KEYWORD && self <= Self::LAST_CONTEXTUAL_KEYWORD
    }

    /// Identifier or a keyword usable as an identifier in binding position.
    #[inline]
    pub fn is_identifier_like(self) -> bool {
        self == SyntaxKind::Identifier || self.is_contextual_keyword()
    }

    #[inline]
    pub fn is_assignment_operator(self) -> bool {
        self >= SyntaxKind::EqualsToken && self <= SyntaxKind::QuestionQuestionEqualsToken
    }

    #[inline]
    pub fn is_literal(self) -> bool {
        self >= SyntaxKind::NumericLiteral && self <= SyntaxKind::NoSubstitutionTemplateLiteral
    }

    #[inline]
    pub fn is_trivia(self) -> bool {
        self >= SyntaxKind::SingleLineCommentTrivia && self <= SyntaxKind::WhitespaceTrivia
    }
}

/// Map keyword text to its kind.
pub fn keyword_to_kind(text: &str) -> Option<SyntaxKind> {
    let kind = match text {
        "break" => SyntaxKind::BreakKeyword,
        "case" => SyntaxKind::CaseKeyword,
        "catch" => SyntaxKind::CatchKeyword,
        "class" => SyntaxKind::ClassKeyword,
        "const" => SyntaxKind::ConstKeyword,
        "continue" => SyntaxKind::ContinueKeyword,
        "debugger" => SyntaxKind::DebuggerKeyword,
        "default" => SyntaxKind::DefaultKeyword,
        "delete" => SyntaxKind::DeleteKeyword,
        "do" => SyntaxKind::DoKeyword,
        "else" => SyntaxKind::ElseKeyword,
        "enum" => SyntaxKind::EnumKeyword,
        "export" => SyntaxKind::ExportKeyword,
        "extends" => SyntaxKind::ExtendsKeyword,
        "false" => SyntaxKind::FalseKeyword,
        "finally" => SyntaxKind::FinallyKeyword,
        "for" => SyntaxKind::ForKeyword,
        "function" => SyntaxKind::FunctionKeyword,
        "if" => SyntaxKind::IfKeyword,
        "import" => SyntaxKind::ImportKeyword,
        "in" => SyntaxKind::InKeyword,
        "instanceof" => SyntaxKind::InstanceOfKeyword,
        "new" => SyntaxKind::NewKeyword,
        "null" => SyntaxKind::NullKeyword,
        "return" => SyntaxKind::ReturnKeyword,
        "super" => SyntaxKind::SuperKeyword,
        "switch" => SyntaxKind::SwitchKeyword,
        "this" => SyntaxKind::ThisKeyword,
        "throw" => SyntaxKind::ThrowKeyword,
        "true" => SyntaxKind::TrueKeyword,
        "try" => SyntaxKind::TryKeyword,
        "typeof" => SyntaxKind::TypeOfKeyword,
        "var" => SyntaxKind::VarKeyword,
        "void" => SyntaxKind::VoidKeyword,
        "while" => SyntaxKind::WhileKeyword,
        "with" => SyntaxKind::WithKeyword,
        "abstract" => SyntaxKind::AbstractKeyword,
        "as" => SyntaxKind::AsKeyword,
        "async" => SyntaxKind::AsyncKeyword,
        "await" => SyntaxKind::AwaitKeyword,
        "constructor" => SyntaxKind::ConstructorKeyword,
        "declare" => SyntaxKind::DeclareKeyword,
        "from" => SyntaxKind::FromKeyword,
        "get" => SyntaxKind::GetKeyword,
        "implements" => SyntaxKind::ImplementsKeyword,
        "interface" => SyntaxKind::InterfaceKeyword,
        "keyof" => SyntaxKind::KeyOfKeyword,
        "let" => SyntaxKind::LetKeyword,
        "module" => SyntaxKind::ModuleKeyword,
        "namespace" => SyntaxKind::NamespaceKeyword,
        "of" => SyntaxKind::OfKeyword,
        "override" => SyntaxKind::OverrideKeyword,
        "private" => SyntaxKind::PrivateKeyword,
        "protected" => SyntaxKind::ProtectedKeyword,
        "public" => SyntaxKind::PublicKeyword,
        "readonly" => SyntaxKind::ReadonlyKeyword,
        "satisfies" => SyntaxKind::SatisfiesKeyword,
        "set" => SyntaxKind::SetKeyword,
        "static" => SyntaxKind::StaticKeyword,
        "type" => SyntaxKind::TypeKeyword,
        "yield" => SyntaxKind::YieldKeyword,
        _ => return None,
    };
    Some(kind)
}

/// Source text of a punctuation or keyword token.
pub fn token_to_string(kind: SyntaxKind) -> Option<&'static str> {
    let text = match kind {
        SyntaxKind::OpenBraceToken => "{",
        SyntaxKind::CloseBraceToken => "}",
        SyntaxKind::OpenParenToken => "(",
        SyntaxKind::CloseParenToken => ")",
        SyntaxKind::OpenBracketToken => "[",
        SyntaxKind::CloseBracketToken => "]",
        SyntaxKind::DotToken => ".",
        SyntaxKind::DotDotDotToken => "...",
        SyntaxKind::SemicolonToken => ";",
        SyntaxKind::CommaToken => ",",
        SyntaxKind::QuestionDotToken => "?.",
        SyntaxKind::LessThanToken => "<",
        SyntaxKind::GreaterThanToken => ">",
        SyntaxKind::LessThanEqualsToken => "<=",
        SyntaxKind::GreaterThanEqualsToken => ">=",
        SyntaxKind::EqualsEqualsToken => "==",
        SyntaxKind::ExclamationEqualsToken => "!=",
        SyntaxKind::EqualsEqualsEqualsToken => "===",
        SyntaxKind::ExclamationEqualsEqualsToken => "!==",
        SyntaxKind::EqualsGreaterThanToken => "=>",
        SyntaxKind::PlusToken => "+",
        SyntaxKind::MinusToken => "-",
        SyntaxKind::AsteriskToken => "*",
        SyntaxKind::AsteriskAsteriskToken => "**",
        SyntaxKind::SlashToken => "/",
        SyntaxKind::PercentToken => "%",
        SyntaxKind::PlusPlusToken => "++",
        SyntaxKind::MinusMinusToken => "--",
        SyntaxKind::LessThanLessThanToken => "<<",
        SyntaxKind::GreaterThanGreaterThanToken => ">>",
        SyntaxKind::GreaterThanGreaterThanGreaterThanToken => ">>>",
        SyntaxKind::AmpersandToken => "&",
        SyntaxKind::BarToken => "|",
        SyntaxKind::CaretToken => "^",
        SyntaxKind::ExclamationToken => "!",
        SyntaxKind::TildeToken => "~",
        SyntaxKind::AmpersandAmpersandToken => "&&",
        SyntaxKind::BarBarToken => "||",
        SyntaxKind::QuestionToken => "?",
        SyntaxKind::ColonToken => ":",
        SyntaxKind::AtToken => "@",
        SyntaxKind::QuestionQuestionToken => "??",
        SyntaxKind::EqualsToken => "=",
        SyntaxKind::PlusEqualsToken => "+=",
        SyntaxKind::MinusEqualsToken => "-=",
        SyntaxKind::AsteriskEqualsToken => "*=",
        SyntaxKind::AsteriskAsteriskEqualsToken => "**=",
        SyntaxKind::SlashEqualsToken => "/=",
        SyntaxKind::PercentEqualsToken => "%=",
        SyntaxKind::LessThanLessThanEqualsToken => "<<=",
        SyntaxKind::GreaterThanGreaterThanEqualsToken => ">>=",
        SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken => ">>>=",
        SyntaxKind::AmpersandEqualsToken => "&=",
        SyntaxKind::BarEqualsToken => "|=",
        SyntaxKind::CaretEqualsToken => "^=",
        SyntaxKind::BarBarEqualsToken => "||=",
        SyntaxKind::AmpersandAmpersandEqualsToken => "&&=",
        SyntaxKind::QuestionQuestionEqualsToken => "??=",
        SyntaxKind::BreakKeyword => "break",
        SyntaxKind::CaseKeyword => "case",
        SyntaxKind::CatchKeyword => "catch",
        SyntaxKind::ClassKeyword => "class",
        SyntaxKind::ConstKeyword => "const",
        SyntaxKind::ContinueKeyword => "continue",
        SyntaxKind::DebuggerKeyword => "debugger",
        SyntaxKind::DefaultKeyword => "default",
        SyntaxKind::DeleteKeyword => "delete",
        SyntaxKind::DoKeyword => "do",
        SyntaxKind::ElseKeyword => "else",
        SyntaxKind::EnumKeyword => "enum",
        SyntaxKind::ExportKeyword => "export",
        SyntaxKind::ExtendsKeyword => "extends",
        SyntaxKind::FalseKeyword => "false",
        SyntaxKind::FinallyKeyword => "finally",
        SyntaxKind::ForKeyword => "for",
        SyntaxKind::FunctionKeyword => "function",
        SyntaxKind::IfKeyword => "if",
        SyntaxKind::ImportKeyword => "import",
        SyntaxKind::InKeyword => "in",
        SyntaxKind::InstanceOfKeyword => "instanceof",
        SyntaxKind::NewKeyword => "new",
        SyntaxKind::NullKeyword => "null",
        SyntaxKind::ReturnKeyword => "return",
        SyntaxKind::SuperKeyword => "super",
        SyntaxKind::SwitchKeyword => "switch",
        SyntaxKind::ThisKeyword => "this",
        SyntaxKind::ThrowKeyword => "throw",
        SyntaxKind::TrueKeyword => "true",
        SyntaxKind::TryKeyword => "try",
        SyntaxKind::TypeOfKeyword => "typeof",
        SyntaxKind::VarKeyword => "var",
        SyntaxKind::VoidKeyword => "void",
        SyntaxKind::WhileKeyword => "while",
        SyntaxKind::WithKeyword => "with",
        SyntaxKind::AbstractKeyword => "abstract",
        SyntaxKind::AsKeyword => "as",
        SyntaxKind::AsyncKeyword => "async",
        SyntaxKind::AwaitKeyword => "await",
        SyntaxKind::ConstructorKeyword => "constructor",
        SyntaxKind::DeclareKeyword => "declare",
        SyntaxKind::FromKeyword => "from",
        SyntaxKind::GetKeyword => "get",
        SyntaxKind::ImplementsKeyword => "implements",
        SyntaxKind::InterfaceKeyword => "interface",
        SyntaxKind::KeyOfKeyword => "keyof",
        SyntaxKind::LetKeyword => "let",
        SyntaxKind::ModuleKeyword => "module",
        SyntaxKind::NamespaceKeyword => "namespace",
        SyntaxKind::OfKeyword => "of",
        SyntaxKind::OverrideKeyword => "override",
        SyntaxKind::PrivateKeyword => "private",
        SyntaxKind::ProtectedKeyword => "protected",
        SyntaxKind::PublicKeyword => "public",
        SyntaxKind::ReadonlyKeyword => "readonly",
        SyntaxKind::SatisfiesKeyword => "satisfies",
        SyntaxKind::SetKeyword => "set",
        SyntaxKind::StaticKeyword => "static",
        SyntaxKind::TypeKeyword => "type",
        SyntaxKind::YieldKeyword => "yield",
        _ => return None,
    };
    Some(text)
}
