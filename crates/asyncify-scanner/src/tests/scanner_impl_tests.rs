use super::*;

fn scan_all(source: &str) -> Vec<SyntaxKind> {
    let mut scanner = ScannerState::new(source.to_string(), true);
    let mut kinds = Vec::new();
    loop {
        let kind = scanner.scan();
        if kind == SyntaxKind::EndOfFileToken {
            break;
        }
        kinds.push(kind);
    }
    kinds
}

#[test]
fn test_scan_empty() {
    let mut scanner = ScannerState::new(String::new(), true);
    assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
}

#[test]
fn test_scan_whitespace() {
    let mut scanner = ScannerState::new("   ".to_string(), false);
    assert_eq!(scanner.scan(), SyntaxKind::WhitespaceTrivia);
    assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
}

#[test]
fn test_scan_newline_sets_flag() {
    let mut scanner = ScannerState::new("a\n  b".to_string(), true);
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert!(!scanner.has_preceding_line_break());
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert!(scanner.has_preceding_line_break());
    assert_eq!(scanner.get_token_value(), "b");
}

#[test]
fn test_scan_keywords_and_identifiers() {
    assert_eq!(
        scan_all("return fetch then async await"),
        vec![
            SyntaxKind::ReturnKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::Identifier,
            SyntaxKind::AsyncKeyword,
            SyntaxKind::AwaitKeyword,
        ]
    );
}

#[test]
fn test_scan_compound_operators() {
    assert_eq!(
        scan_all("=== !== == != => && || ?? ?. ... **="),
        vec![
            SyntaxKind::EqualsEqualsEqualsToken,
            SyntaxKind::ExclamationEqualsEqualsToken,
            SyntaxKind::EqualsEqualsToken,
            SyntaxKind::ExclamationEqualsToken,
            SyntaxKind::EqualsGreaterThanToken,
            SyntaxKind::AmpersandAmpersandToken,
            SyntaxKind::BarBarToken,
            SyntaxKind::QuestionQuestionToken,
            SyntaxKind::QuestionDotToken,
            SyntaxKind::DotDotDotToken,
            SyntaxKind::AsteriskAsteriskEqualsToken,
        ]
    );
}

#[test]
fn test_question_dot_before_digit_is_conditional() {
    assert_eq!(
        scan_all("a?.5:1"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::QuestionToken,
            SyntaxKind::NumericLiteral,
            SyntaxKind::ColonToken,
            SyntaxKind::NumericLiteral,
        ]
    );
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        scan_all("a // line\n /* block\n */ b"),
        vec![SyntaxKind::Identifier, SyntaxKind::Identifier]
    );
}

#[test]
fn test_string_escapes_are_cooked() {
    let mut scanner = ScannerState::new(r#"'a\'b\n' "A""#.to_string(), true);
    assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
    assert_eq!(scanner.get_token_value(), "a'b\n");
    assert_eq!(scanner.get_token_text(), r"'a\'b\n'");
    assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
    assert_eq!(scanner.get_token_value(), "A");
}

#[test]
fn test_unterminated_string_reports_diagnostic() {
    let mut scanner = ScannerState::new("'abc\n".to_string(), true);
    assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
    assert!(scanner.is_unterminated());
    assert_eq!(scanner.get_scanner_diagnostics().len(), 1);
    assert_eq!(scanner.get_scanner_diagnostics()[0].code, 1002);
}

#[test]
fn test_numbers() {
    let mut scanner = ScannerState::new("1_000 0xFF 1.5e-3 10n .25".to_string(), true);
    assert_eq!(scanner.scan(), SyntaxKind::NumericLiteral);
    assert_eq!(scanner.get_token_value(), "1_000");
    assert_eq!(scanner.scan(), SyntaxKind::NumericLiteral);
    assert_eq!(scanner.get_token_value(), "0xFF");
    assert_eq!(scanner.scan(), SyntaxKind::NumericLiteral);
    assert_eq!(scanner.get_token_value(), "1.5e-3");
    assert_eq!(scanner.scan(), SyntaxKind::BigIntLiteral);
    assert_eq!(scanner.scan(), SyntaxKind::NumericLiteral);
    assert_eq!(scanner.get_token_value(), ".25");
}

#[test]
fn test_template_with_substitution() {
    let mut scanner = ScannerState::new("`a${x}b${y}c`".to_string(), true);
    assert_eq!(scanner.scan(), SyntaxKind::TemplateHead);
    assert_eq!(scanner.get_token_value(), "a");
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.scan(), SyntaxKind::CloseBraceToken);
    assert_eq!(scanner.rescan_template_token(), SyntaxKind::TemplateMiddle);
    assert_eq!(scanner.get_token_value(), "b");
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.scan(), SyntaxKind::CloseBraceToken);
    assert_eq!(scanner.rescan_template_token(), SyntaxKind::TemplateTail);
    assert_eq!(scanner.get_token_value(), "c");
    assert_eq!(scanner.scan(), SyntaxKind::EndOfFileToken);
}

#[test]
fn test_no_substitution_template() {
    let mut scanner = ScannerState::new("`plain`".to_string(), true);
    assert_eq!(scanner.scan(), SyntaxKind::NoSubstitutionTemplateLiteral);
    assert_eq!(scanner.get_token_text(), "`plain`");
}

#[test]
fn test_rescan_greater_token() {
    let mut scanner = ScannerState::new("a >>= b".to_string(), true);
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.scan(), SyntaxKind::GreaterThanToken);
    assert_eq!(
        scanner.rescan_greater_token(),
        SyntaxKind::GreaterThanGreaterThanEqualsToken
    );
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
}

#[test]
fn test_rescan_slash_as_regex() {
    let mut scanner = ScannerState::new("/a[/]b\\//gi.test".to_string(), true);
    assert_eq!(scanner.scan(), SyntaxKind::SlashToken);
    assert_eq!(
        scanner.rescan_slash_token(),
        SyntaxKind::RegularExpressionLiteral
    );
    assert_eq!(scanner.get_token_text(), "/a[/]b\\//gi");
    assert_eq!(scanner.scan(), SyntaxKind::DotToken);
}

#[test]
fn test_save_and_restore_state() {
    let mut scanner = ScannerState::new("(a, b) => c".to_string(), true);
    assert_eq!(scanner.scan(), SyntaxKind::OpenParenToken);
    let snapshot = scanner.save_state();
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.scan(), SyntaxKind::CommaToken);
    scanner.restore_state(snapshot);
    assert_eq!(scanner.get_token(), SyntaxKind::OpenParenToken);
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert_eq!(scanner.get_token_value(), "a");
}

#[test]
fn test_private_identifier() {
    let mut scanner = ScannerState::new("this.#count".to_string(), true);
    assert_eq!(scanner.scan(), SyntaxKind::ThisKeyword);
    assert_eq!(scanner.scan(), SyntaxKind::DotToken);
    assert_eq!(scanner.scan(), SyntaxKind::PrivateIdentifier);
    assert_eq!(scanner.get_token_value(), "#count");
}

#[test]
fn test_kind_round_trips_through_u16() {
    let kind = SyntaxKind::AwaitKeyword;
    assert_eq!(SyntaxKind::from_u16(kind as u16), Some(kind));
    assert_eq!(SyntaxKind::from_u16(SyntaxKind::COUNT), None);
    assert!(SyntaxKind::AsyncKeyword.is_contextual_keyword());
    assert!(SyntaxKind::ReturnKeyword.is_reserved_word());
    assert_eq!(crate::token_to_string(SyntaxKind::QuestionQuestionToken), Some("??"));
}
