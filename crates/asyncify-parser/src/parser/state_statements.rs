//! Parser state - statement and declaration parsing methods

use super::state::{CONTEXT_FLAG_DISALLOW_IN, ParseDiagnostic, ParserState};
use super::state_expressions::{is_property_name_start, is_property_name_start_or_asterisk};
use crate::parser::{NodeIndex, NodeList, node::*, node_flags, syntax_kind_ext};
use asyncify_common::diagnostics::diagnostic_messages;
use asyncify_scanner::SyntaxKind;

impl ParserState {
    // =========================================================================
    // Source file
    // =========================================================================

    /// Parse a source file
    pub fn parse_source_file(&mut self) -> NodeIndex {
        let start_pos = 0u32;
        self.next_token();

        let statements = self.parse_source_file_statements();

        for diag in self.scanner.get_scanner_diagnostics() {
            let start = u32::try_from(diag.pos).unwrap_or(u32::MAX);
            let length = u32::try_from(diag.length).unwrap_or(u32::MAX);
            self.parse_diagnostics.push(ParseDiagnostic {
                start,
                length,
                message: diag.message.to_string(),
                code: diag.code,
            });
        }
        self.parse_diagnostics.sort_by_key(|d| d.start);

        let end_pos = self.token_end();
        let eof_token = self
            .arena
            .add_token(SyntaxKind::EndOfFileToken as u16, end_pos, end_pos);

        tracing::debug!(
            file = %self.file_name,
            nodes = self.arena.len(),
            errors = self.parse_diagnostics.len(),
            "parsed source file"
        );

        self.arena.add_source_file(
            start_pos,
            end_pos,
            SourceFileData {
                statements,
                end_of_file_token: eof_token,
                file_name: self.file_name.clone(),
            },
        )
    }

    /// Top-level statements. Stray `}` are reported and skipped.
    fn parse_source_file_statements(&mut self) -> NodeList {
        let list_pos = self.token_pos();
        let mut statements = Vec::new();

        while !self.is_token(SyntaxKind::EndOfFileToken) {
            if self.is_token(SyntaxKind::CloseBraceToken) {
                self.error_message(diagnostic_messages::DECLARATION_OR_STATEMENT_EXPECTED);
                self.next_token();
                continue;
            }
            self.parse_statement_into(&mut statements);
        }

        NodeList {
            nodes: statements,
            pos: list_pos,
            end: self.token_pos(),
            has_trailing_comma: false,
        }
    }

    /// Parse one statement, guaranteeing progress.
    fn parse_statement_into(&mut self, statements: &mut Vec<NodeIndex>) {
        let pos_before = self.token_pos();
        let statement = self.parse_statement();
        if statement.is_some() {
            statements.push(statement);
        }
        if self.token_pos() == pos_before && !self.is_token(SyntaxKind::EndOfFileToken) {
            self.error_message(diagnostic_messages::DECLARATION_OR_STATEMENT_EXPECTED);
            self.next_token();
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub(crate) fn parse_statement(&mut self) -> NodeIndex {
        if !self.enter_recursion() {
            return NodeIndex::NONE;
        }
        let result = self.parse_statement_worker();
        self.exit_recursion();
        result
    }

    fn parse_statement_worker(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        match self.token() {
            SyntaxKind::OpenBraceToken => self.parse_block(),
            SyntaxKind::SemicolonToken => {
                self.next_token();
                let end_pos = self.node_end();
                self.arena
                    .add_token(syntax_kind_ext::EMPTY_STATEMENT, start_pos, end_pos)
            }
            SyntaxKind::VarKeyword => self.parse_variable_statement(start_pos, None),
            SyntaxKind::LetKeyword if self.is_let_declaration() => {
                self.parse_variable_statement(start_pos, None)
            }
            SyntaxKind::ConstKeyword => {
                if self.next_token_is(SyntaxKind::EnumKeyword) {
                    self.parse_verbatim_statement(syntax_kind_ext::ENUM_DECLARATION, start_pos)
                } else {
                    self.parse_variable_statement(start_pos, None)
                }
            }
            SyntaxKind::FunctionKeyword => self.parse_function_declaration(start_pos, None),
            SyntaxKind::AsyncKeyword
                if self.next_token_on_same_line(|next| next == SyntaxKind::FunctionKeyword) =>
            {
                self.parse_function_declaration(start_pos, None)
            }
            SyntaxKind::ClassKeyword => {
                self.parse_class(syntax_kind_ext::CLASS_DECLARATION, start_pos, None)
            }
            SyntaxKind::AbstractKeyword
                if self.next_token_on_same_line(|next| next == SyntaxKind::ClassKeyword) =>
            {
                let modifiers = self.parse_modifier_tokens(1);
                self.parse_class(syntax_kind_ext::CLASS_DECLARATION, start_pos, modifiers)
            }
            SyntaxKind::AtToken => {
                let modifiers = self.parse_decorators_and_modifiers();
                if self.is_token(SyntaxKind::ExportKeyword) {
                    return self.parse_export(start_pos, modifiers);
                }
                self.parse_class(syntax_kind_ext::CLASS_DECLARATION, start_pos, modifiers)
            }
            SyntaxKind::IfKeyword => self.parse_if_statement(),
            SyntaxKind::DoKeyword => self.parse_do_statement(),
            SyntaxKind::WhileKeyword => self.parse_while_statement(),
            SyntaxKind::ForKeyword => self.parse_for_statement(),
            SyntaxKind::ContinueKeyword => {
                self.parse_jump_statement(syntax_kind_ext::CONTINUE_STATEMENT)
            }
            SyntaxKind::BreakKeyword => self.parse_jump_statement(syntax_kind_ext::BREAK_STATEMENT),
            SyntaxKind::ReturnKeyword => {
                self.parse_return_or_throw(syntax_kind_ext::RETURN_STATEMENT)
            }
            SyntaxKind::ThrowKeyword => self.parse_return_or_throw(syntax_kind_ext::THROW_STATEMENT),
            SyntaxKind::SwitchKeyword => self.parse_switch_statement(),
            SyntaxKind::TryKeyword => self.parse_try_statement(),
            SyntaxKind::DebuggerKeyword => {
                self.next_token();
                self.parse_semicolon();
                let end_pos = self.node_end();
                self.arena
                    .add_token(syntax_kind_ext::DEBUGGER_STATEMENT, start_pos, end_pos)
            }
            SyntaxKind::ImportKeyword
                if !self.look_ahead(|p| {
                    matches!(
                        p.next_token(),
                        SyntaxKind::OpenParenToken | SyntaxKind::DotToken
                    )
                }) =>
            {
                self.parse_verbatim_statement(syntax_kind_ext::IMPORT_DECLARATION, start_pos)
            }
            SyntaxKind::ExportKeyword => self.parse_export(start_pos, None),
            SyntaxKind::InterfaceKeyword
                if self.next_token_on_same_line(|next| next.is_identifier_like()) =>
            {
                self.parse_verbatim_statement(syntax_kind_ext::INTERFACE_DECLARATION, start_pos)
            }
            SyntaxKind::TypeKeyword
                if self.next_token_on_same_line(|next| next.is_identifier_like()) =>
            {
                self.parse_verbatim_statement(syntax_kind_ext::TYPE_ALIAS_DECLARATION, start_pos)
            }
            SyntaxKind::EnumKeyword => {
                self.parse_verbatim_statement(syntax_kind_ext::ENUM_DECLARATION, start_pos)
            }
            SyntaxKind::NamespaceKeyword | SyntaxKind::ModuleKeyword
                if self.next_token_on_same_line(|next| {
                    next.is_identifier_like() || next == SyntaxKind::StringLiteral
                }) =>
            {
                self.parse_verbatim_statement(syntax_kind_ext::MODULE_DECLARATION, start_pos)
            }
            SyntaxKind::DeclareKeyword
                if self.next_token_on_same_line(|next| {
                    next.is_keyword() || next == SyntaxKind::Identifier
                }) =>
            {
                self.parse_verbatim_statement(syntax_kind_ext::MODULE_DECLARATION, start_pos)
            }
            _ if self.is_identifier()
                && self.next_token_is(SyntaxKind::ColonToken) =>
            {
                self.parse_labeled_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    /// `let` starts a declaration when a binding name follows.
    fn is_let_declaration(&mut self) -> bool {
        self.look_ahead(|p| {
            let next = p.next_token();
            next.is_identifier_like()
                || matches!(
                    next,
                    SyntaxKind::OpenBraceToken | SyntaxKind::OpenBracketToken
                )
        })
    }

    pub(crate) fn parse_block(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let multi_line = self.has_preceding_line_break();
        let list_pos = self.token_pos();
        let mut statements = Vec::new();

        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            self.parse_statement_into(&mut statements);
        }

        let list_end = self.token_pos();
        self.parse_expected(SyntaxKind::CloseBraceToken);
        let end_pos = self.node_end();
        self.arena.add_block(
            syntax_kind_ext::BLOCK,
            start_pos,
            end_pos,
            BlockData {
                statements: NodeList {
                    nodes: statements,
                    pos: list_pos,
                    end: list_end,
                    has_trailing_comma: false,
                },
                multi_line,
            },
        )
    }

    fn parse_expression_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let expression = self.parse_expression_allow_in();
        if expression.is_none() {
            return NodeIndex::NONE;
        }
        self.parse_semicolon();
        let end_pos = self.node_end();
        self.arena.add_expr_statement(
            syntax_kind_ext::EXPRESSION_STATEMENT,
            start_pos,
            end_pos,
            ExprStatementData { expression },
        )
    }

    fn parse_labeled_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        let label = self.parse_identifier();
        self.parse_expected(SyntaxKind::ColonToken);
        let statement = self.parse_statement();
        let end_pos = self.node_end();
        self.arena.add_labeled(
            syntax_kind_ext::LABELED_STATEMENT,
            start_pos,
            end_pos,
            LabeledData { label, statement },
        )
    }

    // =========================================================================
    // Variables
    // =========================================================================

    fn parse_variable_statement(
        &mut self,
        start_pos: u32,
        modifiers: Option<NodeList>,
    ) -> NodeIndex {
        let (flags, declarations) = self.parse_variable_declarations();
        self.parse_semicolon();
        let end_pos = self.node_end();
        self.arena.add_variable_with_flags(
            syntax_kind_ext::VARIABLE_STATEMENT,
            start_pos,
            end_pos,
            VariableData {
                modifiers,
                declarations,
            },
            flags,
        )
    }

    /// `var|let|const a = 1, b` without the trailing semicolon.
    fn parse_variable_declarations(&mut self) -> (u32, NodeList) {
        let flags = match self.token() {
            SyntaxKind::LetKeyword => node_flags::LET,
            SyntaxKind::ConstKeyword => node_flags::CONST,
            _ => node_flags::NONE,
        };
        self.next_token();

        let list_pos = self.token_pos();
        let mut declarations = Vec::new();
        loop {
            let decl_start = self.token_pos();
            let name = self.parse_binding_name();
            let exclamation_token = self.parse_optional(SyntaxKind::ExclamationToken);
            let type_annotation = self.parse_type_annotation_opt();
            let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                self.parse_assignment_expression()
            } else {
                NodeIndex::NONE
            };
            let decl_end = self.node_end();
            declarations.push(self.arena.add_variable_declaration(
                syntax_kind_ext::VARIABLE_DECLARATION,
                decl_start,
                decl_end,
                VariableDeclarationData {
                    name,
                    exclamation_token,
                    type_annotation,
                    initializer,
                },
            ));
            if name.is_none() || !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }

        let list = NodeList {
            nodes: declarations,
            pos: list_pos,
            end: self.node_end(),
            has_trailing_comma: false,
        };
        (flags, list)
    }

    // =========================================================================
    // Functions and classes
    // =========================================================================

    fn parse_function_declaration(
        &mut self,
        start_pos: u32,
        modifiers: Option<NodeList>,
    ) -> NodeIndex {
        let is_async = self.parse_optional(SyntaxKind::AsyncKeyword);
        self.parse_expected(SyntaxKind::FunctionKeyword);
        let asterisk_token = self.parse_optional(SyntaxKind::AsteriskToken);
        let name = if self.is_identifier() {
            self.parse_identifier()
        } else {
            NodeIndex::NONE
        };
        self.parse_function_rest(
            syntax_kind_ext::FUNCTION_DECLARATION,
            start_pos,
            modifiers,
            is_async,
            asterisk_token,
            name,
        )
    }

    /// Consume `count` modifier keywords as token nodes.
    fn parse_modifier_tokens(&mut self, count: usize) -> Option<NodeList> {
        let mut nodes = Vec::with_capacity(count);
        for _ in 0..count {
            let pos = self.token_pos();
            let kind = self.token() as u16;
            self.next_token();
            let end = self.node_end();
            nodes.push(self.arena.add_token(kind, pos, end));
        }
        Some(NodeList::from_nodes(nodes))
    }

    /// `@decorator` entries are kept as opaque text nodes in the modifier list.
    fn parse_decorators_and_modifiers(&mut self) -> Option<NodeList> {
        let mut nodes = Vec::new();
        while self.is_token(SyntaxKind::AtToken) {
            let pos = self.token_pos();
            self.next_token();
            self.parse_left_hand_side_expression();
            let end = self.node_end();
            let text = self.text_slice(pos, end);
            nodes.push(
                self.arena
                    .add_type_node(syntax_kind_ext::TYPE_NODE, pos, end, TypeNodeData { text }),
            );
        }
        if self.is_token(SyntaxKind::AbstractKeyword) {
            let pos = self.token_pos();
            self.next_token();
            let end = self.node_end();
            nodes.push(
                self.arena
                    .add_token(SyntaxKind::AbstractKeyword as u16, pos, end),
            );
        }
        (!nodes.is_empty()).then(|| NodeList::from_nodes(nodes))
    }

    pub(crate) fn parse_class(
        &mut self,
        kind: u16,
        start_pos: u32,
        modifiers: Option<NodeList>,
    ) -> NodeIndex {
        self.parse_expected(SyntaxKind::ClassKeyword);
        let name = if self.is_identifier() && !self.is_token(SyntaxKind::ImplementsKeyword) {
            self.parse_identifier()
        } else {
            NodeIndex::NONE
        };
        let type_parameters = self.parse_type_parameters_opt();

        let heritage_clauses = if matches!(
            self.token(),
            SyntaxKind::ExtendsKeyword | SyntaxKind::ImplementsKeyword
        ) {
            let heritage_start = self.token_pos();
            while !self.is_token(SyntaxKind::OpenBraceToken)
                && !self.is_token(SyntaxKind::EndOfFileToken)
            {
                match self.token() {
                    SyntaxKind::OpenParenToken => {
                        self.skip_balanced(SyntaxKind::OpenParenToken, SyntaxKind::CloseParenToken)
                    }
                    SyntaxKind::LessThanToken => self
                        .skip_balanced(SyntaxKind::LessThanToken, SyntaxKind::GreaterThanToken),
                    _ => {
                        self.next_token();
                    }
                }
            }
            let heritage_end = self.node_end();
            let text = self.text_slice(heritage_start, heritage_end);
            self.arena.add_type_node(
                syntax_kind_ext::TYPE_NODE,
                heritage_start,
                heritage_end,
                TypeNodeData { text },
            )
        } else {
            NodeIndex::NONE
        };

        let members_pos = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let mut members = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let pos_before = self.token_pos();
            let member = self.parse_class_member();
            if member.is_some() {
                members.push(member);
            }
            if self.token_pos() == pos_before {
                self.error_message(diagnostic_messages::DECLARATION_OR_STATEMENT_EXPECTED);
                self.next_token();
            }
        }
        let members_end = self.token_end();
        self.parse_expected(SyntaxKind::CloseBraceToken);

        let end_pos = self.node_end();
        self.arena.add_class(
            kind,
            start_pos,
            end_pos,
            ClassData {
                modifiers,
                name,
                type_parameters,
                heritage_clauses,
                members: NodeList {
                    nodes: members,
                    pos: members_pos,
                    end: members_end,
                    has_trailing_comma: false,
                },
            },
        )
    }

    fn parse_class_member(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        if self.is_token(SyntaxKind::SemicolonToken) {
            self.next_token();
            let end_pos = self.node_end();
            return self.arena.add_token(
                syntax_kind_ext::SEMICOLON_CLASS_ELEMENT,
                start_pos,
                end_pos,
            );
        }

        let mut modifier_nodes = Vec::new();
        while self.is_token(SyntaxKind::AtToken) {
            let pos = self.token_pos();
            self.next_token();
            self.parse_left_hand_side_expression();
            let end = self.node_end();
            let text = self.text_slice(pos, end);
            modifier_nodes.push(
                self.arena
                    .add_type_node(syntax_kind_ext::TYPE_NODE, pos, end, TypeNodeData { text }),
            );
        }

        // static { ... }
        if self.is_token(SyntaxKind::StaticKeyword)
            && self.next_token_is(SyntaxKind::OpenBraceToken)
        {
            self.next_token();
            self.skip_balanced(SyntaxKind::OpenBraceToken, SyntaxKind::CloseBraceToken);
            let end_pos = self.node_end();
            let text = self.text_slice(start_pos, end_pos);
            return self.arena.add_type_node(
                syntax_kind_ext::TYPE_NODE,
                start_pos,
                end_pos,
                TypeNodeData { text },
            );
        }

        while self.is_class_member_modifier() {
            let pos = self.token_pos();
            let kind = self.token() as u16;
            self.next_token();
            let end = self.node_end();
            modifier_nodes.push(self.arena.add_token(kind, pos, end));
        }
        let modifiers = (!modifier_nodes.is_empty()).then(|| NodeList::from_nodes(modifier_nodes));

        // Index signature
        if self.is_token(SyntaxKind::OpenBracketToken)
            && self.look_ahead(|p| {
                p.next_token();
                p.token().is_identifier_like() && p.next_token() == SyntaxKind::ColonToken
            })
        {
            self.skip_balanced(SyntaxKind::OpenBracketToken, SyntaxKind::CloseBracketToken);
            self.parse_type_annotation_opt();
            self.parse_semicolon();
            let end_pos = self.node_end();
            let text = self.text_slice(start_pos, end_pos);
            return self.arena.add_type_node(
                syntax_kind_ext::TYPE_NODE,
                start_pos,
                end_pos,
                TypeNodeData { text },
            );
        }

        let is_async = self.is_token(SyntaxKind::AsyncKeyword)
            && self.next_token_on_same_line(is_property_name_start_or_asterisk);
        if is_async {
            self.next_token();
        }
        let asterisk_token = self.parse_optional(SyntaxKind::AsteriskToken);

        if !is_async && !asterisk_token {
            let accessor = match self.token() {
                SyntaxKind::GetKeyword => Some(syntax_kind_ext::GET_ACCESSOR),
                SyntaxKind::SetKeyword => Some(syntax_kind_ext::SET_ACCESSOR),
                _ => None,
            };
            if let Some(kind) = accessor
                && self.look_ahead(|p| is_property_name_start(p.next_token()))
            {
                self.next_token();
                let name = self.parse_property_name();
                return self.parse_method_rest(kind, start_pos, modifiers, false, false, name);
            }

            if self.is_token(SyntaxKind::ConstructorKeyword)
                && self.next_token_is(SyntaxKind::OpenParenToken)
            {
                let name = self.parse_identifier_name();
                return self.parse_function_rest(
                    syntax_kind_ext::CONSTRUCTOR,
                    start_pos,
                    modifiers,
                    false,
                    false,
                    name,
                );
            }
        }

        let name = self.parse_property_name();
        let question_token = self.is_token(SyntaxKind::QuestionToken)
            && self.look_ahead(|p| {
                matches!(
                    p.next_token(),
                    SyntaxKind::OpenParenToken | SyntaxKind::LessThanToken
                )
            });
        if is_async
            || asterisk_token
            || question_token
            || self.is_token(SyntaxKind::OpenParenToken)
            || self.is_token(SyntaxKind::LessThanToken)
        {
            return self.parse_method_rest(
                syntax_kind_ext::METHOD_DECLARATION,
                start_pos,
                modifiers,
                is_async,
                asterisk_token,
                name,
            );
        }

        let question_token = self.parse_optional(SyntaxKind::QuestionToken);
        let exclamation_token = self.parse_optional(SyntaxKind::ExclamationToken);
        let type_annotation = self.parse_type_annotation_opt();
        let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.with_async_context(false, false, |p| p.parse_assignment_expression())
        } else {
            NodeIndex::NONE
        };
        self.parse_semicolon();
        let end_pos = self.node_end();
        self.arena.add_property_decl(
            syntax_kind_ext::PROPERTY_DECLARATION,
            start_pos,
            end_pos,
            PropertyDeclData {
                modifiers,
                name,
                question_token,
                exclamation_token,
                type_annotation,
                initializer,
            },
        )
    }

    /// Modifier keyword followed by something that can still be a member.
    fn is_class_member_modifier(&mut self) -> bool {
        let is_modifier_keyword = matches!(
            self.token(),
            SyntaxKind::PublicKeyword
                | SyntaxKind::PrivateKeyword
                | SyntaxKind::ProtectedKeyword
                | SyntaxKind::StaticKeyword
                | SyntaxKind::ReadonlyKeyword
                | SyntaxKind::AbstractKeyword
                | SyntaxKind::OverrideKeyword
                | SyntaxKind::DeclareKeyword
        ) || self.is_contextual("accessor");
        is_modifier_keyword
            && self.next_token_on_same_line(|next| {
                is_property_name_start_or_asterisk(next) || next == SyntaxKind::AtToken
            })
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    fn parse_if_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let expression = self.parse_expression_allow_in();
        self.parse_expected(SyntaxKind::CloseParenToken);
        let then_statement = self.parse_statement();
        let else_statement = if self.parse_optional(SyntaxKind::ElseKeyword) {
            self.parse_statement()
        } else {
            NodeIndex::NONE
        };
        let end_pos = self.node_end();
        self.arena.add_if_statement(
            syntax_kind_ext::IF_STATEMENT,
            start_pos,
            end_pos,
            IfStatementData {
                expression,
                then_statement,
                else_statement,
            },
        )
    }

    fn parse_do_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let statement = self.parse_statement();
        self.parse_expected(SyntaxKind::WhileKeyword);
        self.parse_expected(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression_allow_in();
        self.parse_expected(SyntaxKind::CloseParenToken);
        self.parse_optional(SyntaxKind::SemicolonToken);
        let end_pos = self.node_end();
        self.arena.add_loop(
            syntax_kind_ext::DO_STATEMENT,
            start_pos,
            end_pos,
            LoopData {
                initializer: NodeIndex::NONE,
                condition,
                incrementor: NodeIndex::NONE,
                statement,
            },
        )
    }

    fn parse_while_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let condition = self.parse_expression_allow_in();
        self.parse_expected(SyntaxKind::CloseParenToken);
        let statement = self.parse_statement();
        let end_pos = self.node_end();
        self.arena.add_loop(
            syntax_kind_ext::WHILE_STATEMENT,
            start_pos,
            end_pos,
            LoopData {
                initializer: NodeIndex::NONE,
                condition,
                incrementor: NodeIndex::NONE,
                statement,
            },
        )
    }

    fn parse_for_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let await_modifier = self.parse_optional(SyntaxKind::AwaitKeyword);
        self.parse_expected(SyntaxKind::OpenParenToken);

        let initializer = if self.is_token(SyntaxKind::SemicolonToken) {
            NodeIndex::NONE
        } else if self.is_token(SyntaxKind::VarKeyword)
            || self.is_token(SyntaxKind::ConstKeyword)
            || (self.is_token(SyntaxKind::LetKeyword) && self.is_let_declaration())
        {
            let list_start = self.token_pos();
            let (flags, declarations) = self.with_context(CONTEXT_FLAG_DISALLOW_IN, 0, |p| {
                p.parse_variable_declarations()
            });
            let list_end = self.node_end();
            self.arena.add_variable_with_flags(
                syntax_kind_ext::VARIABLE_DECLARATION_LIST,
                list_start,
                list_end,
                VariableData {
                    modifiers: None,
                    declarations,
                },
                flags,
            )
        } else {
            self.with_context(CONTEXT_FLAG_DISALLOW_IN, 0, |p| p.parse_expression())
        };

        let of_or_in = if self.is_token(SyntaxKind::OfKeyword) {
            Some(syntax_kind_ext::FOR_OF_STATEMENT)
        } else if self.is_token(SyntaxKind::InKeyword) {
            Some(syntax_kind_ext::FOR_IN_STATEMENT)
        } else {
            None
        };

        if let Some(kind) = of_or_in {
            self.next_token();
            let expression = if kind == syntax_kind_ext::FOR_OF_STATEMENT {
                self.parse_assignment_expression_allow_in()
            } else {
                self.parse_expression_allow_in()
            };
            self.parse_expected(SyntaxKind::CloseParenToken);
            let statement = self.parse_statement();
            let end_pos = self.node_end();
            return self.arena.add_for_in_of(
                kind,
                start_pos,
                end_pos,
                ForInOfData {
                    await_modifier,
                    initializer,
                    expression,
                    statement,
                },
            );
        }

        self.parse_expected(SyntaxKind::SemicolonToken);
        let condition = if self.is_token(SyntaxKind::SemicolonToken) {
            NodeIndex::NONE
        } else {
            self.parse_expression_allow_in()
        };
        self.parse_expected(SyntaxKind::SemicolonToken);
        let incrementor = if self.is_token(SyntaxKind::CloseParenToken) {
            NodeIndex::NONE
        } else {
            self.parse_expression_allow_in()
        };
        self.parse_expected(SyntaxKind::CloseParenToken);
        let statement = self.parse_statement();
        let end_pos = self.node_end();
        self.arena.add_loop(
            syntax_kind_ext::FOR_STATEMENT,
            start_pos,
            end_pos,
            LoopData {
                initializer,
                condition,
                incrementor,
                statement,
            },
        )
    }

    fn parse_jump_statement(&mut self, kind: u16) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let label = if !self.can_parse_semicolon() && self.is_identifier() {
            self.parse_identifier()
        } else {
            NodeIndex::NONE
        };
        self.parse_semicolon();
        let end_pos = self.node_end();
        self.arena
            .add_jump(kind, start_pos, end_pos, JumpData { label })
    }

    fn parse_return_or_throw(&mut self, kind: u16) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let expression = if self.can_parse_semicolon() {
            NodeIndex::NONE
        } else {
            self.parse_expression_allow_in()
        };
        self.parse_semicolon();
        let end_pos = self.node_end();
        self.arena
            .add_return(kind, start_pos, end_pos, ReturnData { expression })
    }

    fn parse_switch_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let expression = self.parse_expression_allow_in();
        self.parse_expected(SyntaxKind::CloseParenToken);

        let block_start = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let multi_line = self.has_preceding_line_break();
        let clauses_pos = self.token_pos();
        let mut clauses = Vec::new();

        while matches!(
            self.token(),
            SyntaxKind::CaseKeyword | SyntaxKind::DefaultKeyword
        ) {
            let clause_start = self.token_pos();
            let (kind, clause_expression) = if self.parse_optional(SyntaxKind::CaseKeyword) {
                (
                    syntax_kind_ext::CASE_CLAUSE,
                    self.parse_expression_allow_in(),
                )
            } else {
                self.next_token();
                (syntax_kind_ext::DEFAULT_CLAUSE, NodeIndex::NONE)
            };
            self.parse_expected(SyntaxKind::ColonToken);

            let statements_pos = self.token_pos();
            let mut statements = Vec::new();
            while !matches!(
                self.token(),
                SyntaxKind::CaseKeyword
                    | SyntaxKind::DefaultKeyword
                    | SyntaxKind::CloseBraceToken
                    | SyntaxKind::EndOfFileToken
            ) {
                self.parse_statement_into(&mut statements);
            }
            let statements_end = self.token_pos();
            let clause_end = self.node_end();
            clauses.push(self.arena.add_case_clause(
                kind,
                clause_start,
                clause_end,
                CaseClauseData {
                    expression: clause_expression,
                    statements: NodeList {
                        nodes: statements,
                        pos: statements_pos,
                        end: statements_end,
                        has_trailing_comma: false,
                    },
                },
            ));
        }

        let clauses_end = self.token_pos();
        self.parse_expected(SyntaxKind::CloseBraceToken);
        let block_end = self.node_end();
        let case_block = self.arena.add_block(
            syntax_kind_ext::CASE_BLOCK,
            block_start,
            block_end,
            BlockData {
                statements: NodeList {
                    nodes: clauses,
                    pos: clauses_pos,
                    end: clauses_end,
                    has_trailing_comma: false,
                },
                multi_line,
            },
        );

        self.arena.add_switch(
            syntax_kind_ext::SWITCH_STATEMENT,
            start_pos,
            block_end,
            SwitchData {
                expression,
                case_block,
            },
        )
    }

    fn parse_try_statement(&mut self) -> NodeIndex {
        let start_pos = self.token_pos();
        self.next_token();
        let try_block = self.parse_block();

        let catch_clause = if self.is_token(SyntaxKind::CatchKeyword) {
            let clause_start = self.token_pos();
            self.next_token();
            let variable_declaration = if self.parse_optional(SyntaxKind::OpenParenToken) {
                let decl_start = self.token_pos();
                let name = self.parse_binding_name();
                let type_annotation = self.parse_type_annotation_opt();
                let decl_end = self.node_end();
                self.parse_expected(SyntaxKind::CloseParenToken);
                self.arena.add_variable_declaration(
                    syntax_kind_ext::VARIABLE_DECLARATION,
                    decl_start,
                    decl_end,
                    VariableDeclarationData {
                        name,
                        exclamation_token: false,
                        type_annotation,
                        initializer: NodeIndex::NONE,
                    },
                )
            } else {
                NodeIndex::NONE
            };
            let block = self.parse_block();
            let clause_end = self.node_end();
            self.arena.add_catch_clause(
                syntax_kind_ext::CATCH_CLAUSE,
                clause_start,
                clause_end,
                CatchClauseData {
                    variable_declaration,
                    block,
                },
            )
        } else {
            NodeIndex::NONE
        };

        let finally_block = if self.parse_optional(SyntaxKind::FinallyKeyword) {
            self.parse_block()
        } else {
            NodeIndex::NONE
        };

        if catch_clause.is_none() && finally_block.is_none() {
            self.parse_expected(SyntaxKind::CatchKeyword);
        }

        let end_pos = self.node_end();
        self.arena.add_try(
            syntax_kind_ext::TRY_STATEMENT,
            start_pos,
            end_pos,
            TryData {
                try_block,
                catch_clause,
                finally_block,
            },
        )
    }

    // =========================================================================
    // Modules
    // =========================================================================

    fn parse_export(&mut self, start_pos: u32, decorators: Option<NodeList>) -> NodeIndex {
        let mut modifier_nodes = decorators.map(|list| list.nodes).unwrap_or_default();

        let is_default = self.next_token_is(SyntaxKind::DefaultKeyword);
        let next = self.look_ahead(|p| {
            p.next_token();
            if is_default {
                p.next_token();
            }
            p.token()
        });

        let declaration_follows = match next {
            SyntaxKind::VarKeyword
            | SyntaxKind::LetKeyword
            | SyntaxKind::FunctionKeyword
            | SyntaxKind::ClassKeyword
            | SyntaxKind::AbstractKeyword => true,
            SyntaxKind::ConstKeyword => !self.look_ahead(|p| {
                p.next_token();
                p.next_token() == SyntaxKind::EnumKeyword
            }),
            SyntaxKind::AsyncKeyword => self.look_ahead(|p| {
                p.next_token();
                if is_default {
                    p.next_token();
                }
                p.next_token() == SyntaxKind::FunctionKeyword && !p.has_preceding_line_break()
            }),
            _ => false,
        };

        if !declaration_follows {
            if is_default {
                // export default <expression>;
                self.next_token();
                self.next_token();
                let expression = self.parse_assignment_expression_allow_in();
                self.parse_semicolon();
                let end_pos = self.node_end();
                return self.arena.add_expr_statement(
                    syntax_kind_ext::EXPORT_ASSIGNMENT,
                    start_pos,
                    end_pos,
                    ExprStatementData { expression },
                );
            }
            return self.parse_verbatim_statement(syntax_kind_ext::EXPORT_DECLARATION, start_pos);
        }

        let export_count = if is_default { 2 } else { 1 };
        for _ in 0..export_count {
            let pos = self.token_pos();
            let kind = self.token() as u16;
            self.next_token();
            let end = self.node_end();
            modifier_nodes.push(self.arena.add_token(kind, pos, end));
        }
        if self.is_token(SyntaxKind::AbstractKeyword) {
            let pos = self.token_pos();
            self.next_token();
            let end = self.node_end();
            modifier_nodes.push(
                self.arena
                    .add_token(SyntaxKind::AbstractKeyword as u16, pos, end),
            );
        }
        let modifiers = Some(NodeList::from_nodes(modifier_nodes));

        match self.token() {
            SyntaxKind::VarKeyword | SyntaxKind::LetKeyword | SyntaxKind::ConstKeyword => {
                self.parse_variable_statement(start_pos, modifiers)
            }
            SyntaxKind::ClassKeyword => {
                self.parse_class(syntax_kind_ext::CLASS_DECLARATION, start_pos, modifiers)
            }
            _ => self.parse_function_declaration(start_pos, modifiers),
        }
    }

    /// Skip a declaration with no runtime effect on conversion and keep
    /// its source text.
    fn parse_verbatim_statement(&mut self, kind: u16, start_pos: u32) -> NodeIndex {
        let mut previous = SyntaxKind::Unknown;
        loop {
            let token = self.token();
            if previous != SyntaxKind::Unknown
                && self.has_preceding_line_break()
                && !continues_after(previous)
                && !continues_before(token)
            {
                break;
            }
            match token {
                SyntaxKind::EndOfFileToken | SyntaxKind::CloseBraceToken => break,
                SyntaxKind::SemicolonToken => {
                    self.next_token();
                    break;
                }
                SyntaxKind::OpenBraceToken => {
                    self.skip_balanced(SyntaxKind::OpenBraceToken, SyntaxKind::CloseBraceToken);
                    previous = SyntaxKind::CloseBraceToken;
                    continue;
                }
                SyntaxKind::OpenParenToken => {
                    self.skip_balanced(SyntaxKind::OpenParenToken, SyntaxKind::CloseParenToken);
                    previous = SyntaxKind::CloseParenToken;
                    continue;
                }
                SyntaxKind::OpenBracketToken => {
                    self.skip_balanced(
                        SyntaxKind::OpenBracketToken,
                        SyntaxKind::CloseBracketToken,
                    );
                    previous = SyntaxKind::CloseBracketToken;
                    continue;
                }
                SyntaxKind::TemplateHead => {
                    self.skip_template_substitutions();
                    previous = SyntaxKind::TemplateTail;
                    continue;
                }
                _ => {}
            }
            previous = token;
            self.next_token();
        }

        let end_pos = self.node_end();
        let text = self.text_slice(start_pos, end_pos);
        self.arena
            .add_type_node(kind, start_pos, end_pos, TypeNodeData { text })
    }
}

/// Binary-like tokens that join a declaration across a line break.
fn continues_before(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::BarToken
            | SyntaxKind::AmpersandToken
            | SyntaxKind::DotToken
            | SyntaxKind::EqualsToken
            | SyntaxKind::EqualsGreaterThanToken
            | SyntaxKind::CommaToken
            | SyntaxKind::QuestionToken
            | SyntaxKind::ColonToken
            | SyntaxKind::LessThanToken
            | SyntaxKind::GreaterThanToken
            | SyntaxKind::ExtendsKeyword
            | SyntaxKind::ImplementsKeyword
            | SyntaxKind::FromKeyword
            | SyntaxKind::AsKeyword
    )
}

/// A line ending in one of these continues on the next line.
fn continues_after(kind: SyntaxKind) -> bool {
    continues_before(kind)
        || matches!(
            kind,
            SyntaxKind::KeyOfKeyword
                | SyntaxKind::TypeOfKeyword
                | SyntaxKind::ImportKeyword
                | SyntaxKind::ExportKeyword
                | SyntaxKind::InterfaceKeyword
                | SyntaxKind::TypeKeyword
                | SyntaxKind::EnumKeyword
                | SyntaxKind::NamespaceKeyword
                | SyntaxKind::ModuleKeyword
                | SyntaxKind::DeclareKeyword
                | SyntaxKind::ConstKeyword
                | SyntaxKind::DefaultKeyword
        )
}
