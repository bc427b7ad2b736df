//! NodeArena access methods and the NodeAccess trait.
//!
//! Typed accessors return `None` when the node kind does not match the pool,
//! so callers can chain them with `?` without checking kinds first.

use super::base::{NodeIndex, NodeList};
use super::node::*;
use super::syntax_kind_ext as ext;
use asyncify_scanner::SyntaxKind;

macro_rules! pool_accessor {
    ($(#[$meta:meta])* $name:ident, $pool:ident, $data:ty, [$($kind:expr),+ $(,)?]) => {
        $(#[$meta])*
        #[inline]
        pub fn $name(&self, node: &Node) -> Option<&$data> {
            if node.has_data() && [$($kind),+].contains(&node.kind) {
                self.$pool.get(node.data_index as usize)
            } else {
                None
            }
        }
    };
}

impl NodeArena {
    /// Get a thin node by index
    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    /// Get a mutable thin node by index
    #[inline]
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get_mut(index.0 as usize)
        }
    }

    /// Get extended info for a node
    #[inline]
    pub fn get_extended(&self, index: NodeIndex) -> Option<&ExtendedNodeInfo> {
        if index.is_none() {
            None
        } else {
            self.extended_info.get(index.0 as usize)
        }
    }

    /// Parent of a node, NONE for the root or synthesized detached nodes
    #[inline]
    pub fn parent_of(&self, index: NodeIndex) -> NodeIndex {
        self.get_extended(index)
            .map_or(NodeIndex::NONE, |info| info.parent)
    }

    /// Follow `original` links back to the first node of the chain.
    pub fn original_of(&self, index: NodeIndex) -> NodeIndex {
        let mut current = index;
        // Derived nodes always point at lower indices, so this terminates.
        while let Some(info) = self.get_extended(current) {
            if info.original.is_none() || info.original.0 >= current.0 {
                break;
            }
            current = info.original;
        }
        current
    }

    pool_accessor!(
        /// Get identifier data for a node.
        get_identifier,
        identifiers,
        IdentifierData,
        [
            SyntaxKind::Identifier as u16,
            SyntaxKind::PrivateIdentifier as u16
        ]
    );

    /// Mutable identifier data, used when renaming bindings in a cloned arena.
    pub fn get_identifier_mut(&mut self, index: NodeIndex) -> Option<&mut IdentifierData> {
        let node = *self.get(index)?;
        if node.has_data()
            && (node.kind == SyntaxKind::Identifier as u16
                || node.kind == SyntaxKind::PrivateIdentifier as u16)
        {
            self.identifiers.get_mut(node.data_index as usize)
        } else {
            None
        }
    }

    pool_accessor!(
        /// Get literal data for a node.
        get_literal,
        literals,
        LiteralData,
        [
            SyntaxKind::StringLiteral as u16,
            SyntaxKind::NumericLiteral as u16,
            SyntaxKind::BigIntLiteral as u16,
            SyntaxKind::RegularExpressionLiteral as u16,
            SyntaxKind::NoSubstitutionTemplateLiteral as u16,
            SyntaxKind::TemplateHead as u16,
            SyntaxKind::TemplateMiddle as u16,
            SyntaxKind::TemplateTail as u16,
        ]
    );

    pool_accessor!(
        get_computed_property,
        computed_properties,
        ComputedPropertyData,
        [ext::COMPUTED_PROPERTY_NAME]
    );

    pool_accessor!(
        get_binary_expr,
        binary_exprs,
        BinaryExprData,
        [ext::BINARY_EXPRESSION]
    );

    pool_accessor!(
        get_unary_expr,
        unary_exprs,
        UnaryExprData,
        [ext::PREFIX_UNARY_EXPRESSION, ext::POSTFIX_UNARY_EXPRESSION]
    );

    pool_accessor!(
        /// Await, typeof, void, delete, spread, non-null and yield share a pool.
        get_unary_expr_ex,
        unary_exprs_ex,
        UnaryExprDataEx,
        [
            ext::AWAIT_EXPRESSION,
            ext::TYPE_OF_EXPRESSION,
            ext::VOID_EXPRESSION,
            ext::DELETE_EXPRESSION,
            ext::SPREAD_ELEMENT,
            ext::SPREAD_ASSIGNMENT,
            ext::NON_NULL_EXPRESSION,
            ext::YIELD_EXPRESSION,
        ]
    );

    pool_accessor!(
        /// Get call expression data (call or new).
        get_call_expr,
        call_exprs,
        CallExprData,
        [ext::CALL_EXPRESSION, ext::NEW_EXPRESSION]
    );

    pool_accessor!(
        /// Get property or element access data.
        get_access_expr,
        access_exprs,
        AccessExprData,
        [ext::PROPERTY_ACCESS_EXPRESSION, ext::ELEMENT_ACCESS_EXPRESSION]
    );

    pool_accessor!(
        get_conditional_expr,
        conditional_exprs,
        ConditionalExprData,
        [ext::CONDITIONAL_EXPRESSION]
    );

    pool_accessor!(
        get_literal_expr,
        literal_exprs,
        LiteralExprData,
        [ext::ARRAY_LITERAL_EXPRESSION, ext::OBJECT_LITERAL_EXPRESSION]
    );

    pool_accessor!(
        get_parenthesized,
        parenthesized,
        ParenthesizedData,
        [ext::PARENTHESIZED_EXPRESSION]
    );

    pool_accessor!(
        get_type_assertion,
        type_assertions,
        TypeAssertionData,
        [ext::AS_EXPRESSION, ext::SATISFIES_EXPRESSION]
    );

    pool_accessor!(
        get_template_expr,
        template_exprs,
        TemplateExprData,
        [ext::TEMPLATE_EXPRESSION]
    );

    pool_accessor!(
        get_template_span,
        template_spans,
        TemplateSpanData,
        [ext::TEMPLATE_SPAN]
    );

    pool_accessor!(
        get_tagged_template,
        tagged_templates,
        TaggedTemplateData,
        [ext::TAGGED_TEMPLATE_EXPRESSION]
    );

    pool_accessor!(
        /// Get function data for any function-like node.
        get_function,
        functions,
        FunctionData,
        [
            ext::FUNCTION_DECLARATION,
            ext::FUNCTION_EXPRESSION,
            ext::ARROW_FUNCTION,
            ext::METHOD_DECLARATION,
            ext::CONSTRUCTOR,
            ext::GET_ACCESSOR,
            ext::SET_ACCESSOR,
        ]
    );

    pool_accessor!(
        get_class,
        classes,
        ClassData,
        [ext::CLASS_DECLARATION, ext::CLASS_EXPRESSION]
    );

    pool_accessor!(get_parameter, parameters, ParameterData, [ext::PARAMETER]);

    pool_accessor!(
        get_property_decl,
        property_decls,
        PropertyDeclData,
        [ext::PROPERTY_DECLARATION]
    );

    pool_accessor!(
        get_property_assignment,
        property_assignments,
        PropertyAssignmentData,
        [ext::PROPERTY_ASSIGNMENT, ext::SHORTHAND_PROPERTY_ASSIGNMENT]
    );

    pool_accessor!(
        /// Opaque text for type syntax and declarations kept verbatim.
        get_type_node,
        type_nodes,
        TypeNodeData,
        [
            ext::TYPE_NODE,
            ext::INTERFACE_DECLARATION,
            ext::TYPE_ALIAS_DECLARATION,
            ext::ENUM_DECLARATION,
            ext::MODULE_DECLARATION,
            ext::IMPORT_DECLARATION,
            ext::EXPORT_DECLARATION,
        ]
    );

    pool_accessor!(
        get_block,
        blocks,
        BlockData,
        [ext::BLOCK, ext::CASE_BLOCK]
    );

    pool_accessor!(
        /// Get variable statement or declaration list data.
        get_variable,
        variables,
        VariableData,
        [ext::VARIABLE_STATEMENT, ext::VARIABLE_DECLARATION_LIST]
    );

    pool_accessor!(
        get_variable_declaration,
        variable_declarations,
        VariableDeclarationData,
        [ext::VARIABLE_DECLARATION]
    );

    pool_accessor!(
        get_binding_pattern,
        binding_patterns,
        BindingPatternData,
        [ext::OBJECT_BINDING_PATTERN, ext::ARRAY_BINDING_PATTERN]
    );

    pool_accessor!(
        get_binding_element,
        binding_elements,
        BindingElementData,
        [ext::BINDING_ELEMENT]
    );

    pool_accessor!(
        get_expression_statement,
        expr_statements,
        ExprStatementData,
        [ext::EXPRESSION_STATEMENT, ext::EXPORT_ASSIGNMENT]
    );

    pool_accessor!(
        /// Get return or throw statement data.
        get_return_statement,
        return_data,
        ReturnData,
        [ext::RETURN_STATEMENT, ext::THROW_STATEMENT]
    );

    /// Mutable return data, used when awaiting returned promises in a cloned arena.
    pub fn get_return_statement_mut(&mut self, index: NodeIndex) -> Option<&mut ReturnData> {
        let node = *self.get(index)?;
        if node.has_data() && node.kind == ext::RETURN_STATEMENT {
            self.return_data.get_mut(node.data_index as usize)
        } else {
            None
        }
    }

    pool_accessor!(
        get_if_statement,
        if_statements,
        IfStatementData,
        [ext::IF_STATEMENT]
    );

    pool_accessor!(
        get_loop,
        loops,
        LoopData,
        [ext::FOR_STATEMENT, ext::WHILE_STATEMENT, ext::DO_STATEMENT]
    );

    pool_accessor!(
        get_for_in_of,
        for_in_of,
        ForInOfData,
        [ext::FOR_IN_STATEMENT, ext::FOR_OF_STATEMENT]
    );

    pool_accessor!(get_try, try_data, TryData, [ext::TRY_STATEMENT]);

    pool_accessor!(
        get_catch_clause,
        catch_clauses,
        CatchClauseData,
        [ext::CATCH_CLAUSE]
    );

    pool_accessor!(get_switch, switch_data, SwitchData, [ext::SWITCH_STATEMENT]);

    pool_accessor!(
        get_case_clause,
        case_clauses,
        CaseClauseData,
        [ext::CASE_CLAUSE, ext::DEFAULT_CLAUSE]
    );

    pool_accessor!(
        get_labeled_statement,
        labeled_data,
        LabeledData,
        [ext::LABELED_STATEMENT]
    );

    pool_accessor!(
        get_jump_data,
        jump_data,
        JumpData,
        [ext::BREAK_STATEMENT, ext::CONTINUE_STATEMENT]
    );

    pool_accessor!(
        get_source_file,
        source_files,
        SourceFileData,
        [ext::SOURCE_FILE]
    );

    /// Statements of a block, case clause or source file.
    pub fn get_statements(&self, index: NodeIndex) -> Option<&NodeList> {
        let node = self.get(index)?;
        if let Some(block) = self.get_block(node) {
            return Some(&block.statements);
        }
        if let Some(clause) = self.get_case_clause(node) {
            return Some(&clause.statements);
        }
        self.get_source_file(node).map(|sf| &sf.statements)
    }

    /// Text of an identifier node, by index.
    #[inline]
    pub fn identifier_text(&self, index: NodeIndex) -> Option<&str> {
        let node = self.get(index)?;
        self.get_identifier(node).map(|id| id.escaped_text.as_str())
    }
}

// =============================================================================
// Node kind helpers
// =============================================================================

impl Node {
    #[inline]
    pub fn is_identifier(&self) -> bool {
        self.kind == SyntaxKind::Identifier as u16
    }

    #[inline]
    pub fn is_function_like(&self) -> bool {
        matches!(
            self.kind,
            ext::FUNCTION_DECLARATION
                | ext::FUNCTION_EXPRESSION
                | ext::ARROW_FUNCTION
                | ext::METHOD_DECLARATION
                | ext::CONSTRUCTOR
                | ext::GET_ACCESSOR
                | ext::SET_ACCESSOR
        )
    }

    #[inline]
    pub fn is_function_expression_or_arrow(&self) -> bool {
        self.kind == ext::FUNCTION_EXPRESSION || self.kind == ext::ARROW_FUNCTION
    }

    #[inline]
    pub fn is_class_like(&self) -> bool {
        self.kind == ext::CLASS_DECLARATION || self.kind == ext::CLASS_EXPRESSION
    }
}

// =============================================================================
// NodeAccess trait
// =============================================================================

/// Read-only navigation over an arena, shared by the binder and the
/// conversion passes.
pub trait NodeAccess {
    /// Get the syntax kind of a node
    fn kind(&self, index: NodeIndex) -> Option<u16>;

    /// Get the source position range
    fn pos_end(&self, index: NodeIndex) -> Option<(u32, u32)>;

    /// Check if a node exists
    fn exists(&self, index: NodeIndex) -> bool {
        !index.is_none() && self.kind(index).is_some()
    }

    /// Get identifier text (if this is an identifier node)
    fn get_identifier_text(&self, index: NodeIndex) -> Option<&str>;

    /// Get literal value text (if this is a literal node)
    fn get_literal_text(&self, index: NodeIndex) -> Option<&str>;

    /// Get children of a node in source order
    fn get_children(&self, index: NodeIndex) -> Vec<NodeIndex>;
}

impl NodeAccess for NodeArena {
    fn kind(&self, index: NodeIndex) -> Option<u16> {
        self.get(index).map(|n| n.kind)
    }

    fn pos_end(&self, index: NodeIndex) -> Option<(u32, u32)> {
        self.get(index).map(|n| (n.pos, n.end))
    }

    fn get_identifier_text(&self, index: NodeIndex) -> Option<&str> {
        self.identifier_text(index)
    }

    fn get_literal_text(&self, index: NodeIndex) -> Option<&str> {
        let node = self.get(index)?;
        self.get_literal(node).map(|l| l.text.as_str())
    }

    fn get_children(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let Some(node) = self.get(index) else {
            return Vec::new();
        };

        let mut children = Vec::new();
        let mut add = |idx: NodeIndex| {
            if idx.is_some() {
                children.push(idx);
            }
        };
        fn add_list(add: &mut impl FnMut(NodeIndex), list: &NodeList) {
            for &child in &list.nodes {
                add(child);
            }
        }
        fn add_opt_list(add: &mut impl FnMut(NodeIndex), list: &Option<NodeList>) {
            if let Some(list) = list {
                add_list(add, list);
            }
        }

        if let Some(data) = self.get_computed_property(node) {
            add(data.expression);
        } else if let Some(data) = self.get_binary_expr(node) {
            add(data.left);
            add(data.right);
        } else if let Some(data) = self.get_unary_expr(node) {
            add(data.operand);
        } else if let Some(data) = self.get_unary_expr_ex(node) {
            add(data.expression);
        } else if let Some(data) = self.get_call_expr(node) {
            add(data.expression);
            add(data.type_arguments);
            add_opt_list(&mut add, &data.arguments);
        } else if let Some(data) = self.get_access_expr(node) {
            add(data.expression);
            add(data.name_or_argument);
        } else if let Some(data) = self.get_conditional_expr(node) {
            add(data.condition);
            add(data.when_true);
            add(data.when_false);
        } else if let Some(data) = self.get_literal_expr(node) {
            add_list(&mut add, &data.elements);
        } else if let Some(data) = self.get_parenthesized(node) {
            add(data.expression);
        } else if let Some(data) = self.get_type_assertion(node) {
            add(data.expression);
            add(data.type_node);
        } else if let Some(data) = self.get_template_expr(node) {
            add(data.head);
            add_list(&mut add, &data.template_spans);
        } else if let Some(data) = self.get_template_span(node) {
            add(data.expression);
            add(data.literal);
        } else if let Some(data) = self.get_tagged_template(node) {
            add(data.tag);
            add(data.template);
        } else if let Some(data) = self.get_function(node) {
            add_opt_list(&mut add, &data.modifiers);
            add(data.name);
            add(data.type_parameters);
            add_list(&mut add, &data.parameters);
            add(data.type_annotation);
            add(data.body);
        } else if let Some(data) = self.get_class(node) {
            add_opt_list(&mut add, &data.modifiers);
            add(data.name);
            add(data.type_parameters);
            add(data.heritage_clauses);
            add_list(&mut add, &data.members);
        } else if let Some(data) = self.get_parameter(node) {
            add_opt_list(&mut add, &data.modifiers);
            add(data.name);
            add(data.type_annotation);
            add(data.initializer);
        } else if let Some(data) = self.get_property_decl(node) {
            add_opt_list(&mut add, &data.modifiers);
            add(data.name);
            add(data.type_annotation);
            add(data.initializer);
        } else if let Some(data) = self.get_property_assignment(node) {
            add(data.name);
            add(data.initializer);
        } else if let Some(data) = self.get_block(node) {
            add_list(&mut add, &data.statements);
        } else if let Some(data) = self.get_variable(node) {
            add_opt_list(&mut add, &data.modifiers);
            add_list(&mut add, &data.declarations);
        } else if let Some(data) = self.get_variable_declaration(node) {
            add(data.name);
            add(data.type_annotation);
            add(data.initializer);
        } else if let Some(data) = self.get_binding_pattern(node) {
            add_list(&mut add, &data.elements);
        } else if let Some(data) = self.get_binding_element(node) {
            add(data.property_name);
            add(data.name);
            add(data.initializer);
        } else if let Some(data) = self.get_expression_statement(node) {
            add(data.expression);
        } else if let Some(data) = self.get_return_statement(node) {
            add(data.expression);
        } else if let Some(data) = self.get_if_statement(node) {
            add(data.expression);
            add(data.then_statement);
            add(data.else_statement);
        } else if let Some(data) = self.get_loop(node) {
            if node.kind == ext::DO_STATEMENT {
                add(data.statement);
                add(data.condition);
            } else {
                add(data.initializer);
                add(data.condition);
                add(data.incrementor);
                add(data.statement);
            }
        } else if let Some(data) = self.get_for_in_of(node) {
            add(data.initializer);
            add(data.expression);
            add(data.statement);
        } else if let Some(data) = self.get_try(node) {
            add(data.try_block);
            add(data.catch_clause);
            add(data.finally_block);
        } else if let Some(data) = self.get_catch_clause(node) {
            add(data.variable_declaration);
            add(data.block);
        } else if let Some(data) = self.get_switch(node) {
            add(data.expression);
            add(data.case_block);
        } else if let Some(data) = self.get_case_clause(node) {
            add(data.expression);
            add_list(&mut add, &data.statements);
        } else if let Some(data) = self.get_labeled_statement(node) {
            add(data.label);
            add(data.statement);
        } else if let Some(data) = self.get_jump_data(node) {
            add(data.label);
        } else if let Some(data) = self.get_source_file(node) {
            add_list(&mut add, &data.statements);
        }

        children
    }
}
