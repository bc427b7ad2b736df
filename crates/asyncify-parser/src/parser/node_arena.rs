//! NodeArena creation methods (add_* methods).
//!
//! Every `add_*` pushes the typed data, the thin node and its extended info,
//! then points the children's parent links at the new node.

use super::base::{NodeIndex, NodeList};
use super::node::*;

impl NodeArena {
    /// Maximum pre-allocation to avoid capacity overflow in huge files.
    const MAX_NODE_PREALLOC: usize = 5_000_000;

    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    /// Create an arena with pre-allocated capacity.
    /// Uses rough ratios of typical script composition.
    pub fn with_capacity(capacity: usize) -> NodeArena {
        let safe_capacity = capacity.min(Self::MAX_NODE_PREALLOC);
        let mut arena = NodeArena::default();
        arena.nodes = Vec::with_capacity(safe_capacity);
        arena.extended_info = Vec::with_capacity(safe_capacity);
        arena.identifiers = Vec::with_capacity(safe_capacity / 4);
        arena.literals = Vec::with_capacity(safe_capacity / 8);
        arena.call_exprs = Vec::with_capacity(safe_capacity / 8);
        arena.access_exprs = Vec::with_capacity(safe_capacity / 8);
        arena.blocks = Vec::with_capacity(safe_capacity / 16);
        arena.source_files = Vec::with_capacity(1);
        arena
    }

    /// Number of nodes in the arena
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    fn push_node(&mut self, kind: u16, pos: u32, end: u32, data_index: u32) -> NodeIndex {
        let index = self.nodes.len() as u32;
        self.nodes
            .push(Node::with_data(kind, pos, end, data_index));
        self.extended_info.push(ExtendedNodeInfo::default());
        NodeIndex(index)
    }

    #[inline]
    fn set_parent(&mut self, child: NodeIndex, parent: NodeIndex) {
        if child.is_none() {
            return;
        }
        if let Some(info) = self.extended_info.get_mut(child.0 as usize) {
            info.parent = parent;
        }
    }

    fn set_parent_list(&mut self, list: &NodeList, parent: NodeIndex) {
        for &child in &list.nodes {
            self.set_parent(child, parent);
        }
    }

    fn set_parent_opt_list(&mut self, list: &Option<NodeList>, parent: NodeIndex) {
        if let Some(list) = list {
            self.set_parent_list(list, parent);
        }
    }

    /// Replace the flags of a node.
    pub fn set_flags(&mut self, index: NodeIndex, flags: u32) {
        if let Some(node) = self.nodes.get_mut(index.0 as usize) {
            node.flags = flags as u16;
        }
    }

    /// Record the node `index` was derived from.
    pub fn set_original(&mut self, index: NodeIndex, original: NodeIndex) {
        if let Some(info) = self.extended_info.get_mut(index.0 as usize) {
            info.original = original;
        }
    }

    /// Add a token node (keyword expressions, empty/debugger statements,
    /// omitted expressions, modifiers)
    pub fn add_token(&mut self, kind: u16, pos: u32, end: u32) -> NodeIndex {
        self.push_node(kind, pos, end, Node::NO_DATA)
    }

    /// Add an identifier node
    pub fn add_identifier(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: IdentifierData,
    ) -> NodeIndex {
        let data_index = self.identifiers.len() as u32;
        self.identifiers.push(data);
        self.push_node(kind, pos, end, data_index)
    }

    /// Add a literal node
    pub fn add_literal(&mut self, kind: u16, pos: u32, end: u32, data: LiteralData) -> NodeIndex {
        let data_index = self.literals.len() as u32;
        self.literals.push(data);
        self.push_node(kind, pos, end, data_index)
    }

    pub fn add_computed_property(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: ComputedPropertyData,
    ) -> NodeIndex {
        let expression = data.expression;
        let data_index = self.computed_properties.len() as u32;
        self.computed_properties.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(expression, parent);
        parent
    }

    /// Add a binary expression
    pub fn add_binary_expr(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: BinaryExprData,
    ) -> NodeIndex {
        let (left, right) = (data.left, data.right);
        let data_index = self.binary_exprs.len() as u32;
        self.binary_exprs.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(left, parent);
        self.set_parent(right, parent);
        parent
    }

    /// Add a prefix/postfix unary expression
    pub fn add_unary_expr(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: UnaryExprData,
    ) -> NodeIndex {
        let operand = data.operand;
        let data_index = self.unary_exprs.len() as u32;
        self.unary_exprs.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(operand, parent);
        parent
    }

    /// Add an await/typeof/void/delete/spread/non-null/yield expression
    pub fn add_unary_expr_ex(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: UnaryExprDataEx,
    ) -> NodeIndex {
        let expression = data.expression;
        let data_index = self.unary_exprs_ex.len() as u32;
        self.unary_exprs_ex.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(expression, parent);
        parent
    }

    /// Add a call or new expression
    pub fn add_call_expr(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: CallExprData,
    ) -> NodeIndex {
        let expression = data.expression;
        let type_arguments = data.type_arguments;
        let arguments = data.arguments.clone();
        let data_index = self.call_exprs.len() as u32;
        self.call_exprs.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(expression, parent);
        self.set_parent(type_arguments, parent);
        self.set_parent_opt_list(&arguments, parent);
        parent
    }

    /// Add a property or element access
    pub fn add_access_expr(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: AccessExprData,
    ) -> NodeIndex {
        let (expression, name) = (data.expression, data.name_or_argument);
        let data_index = self.access_exprs.len() as u32;
        self.access_exprs.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(expression, parent);
        self.set_parent(name, parent);
        parent
    }

    pub fn add_conditional_expr(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: ConditionalExprData,
    ) -> NodeIndex {
        let children = [data.condition, data.when_true, data.when_false];
        let data_index = self.conditional_exprs.len() as u32;
        self.conditional_exprs.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        for child in children {
            self.set_parent(child, parent);
        }
        parent
    }

    /// Add an object or array literal
    pub fn add_literal_expr(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: LiteralExprData,
    ) -> NodeIndex {
        let elements = data.elements.clone();
        let data_index = self.literal_exprs.len() as u32;
        self.literal_exprs.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent_list(&elements, parent);
        parent
    }

    pub fn add_parenthesized(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: ParenthesizedData,
    ) -> NodeIndex {
        let expression = data.expression;
        let data_index = self.parenthesized.len() as u32;
        self.parenthesized.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(expression, parent);
        parent
    }

    /// Add an `as` or `satisfies` expression
    pub fn add_type_assertion(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: TypeAssertionData,
    ) -> NodeIndex {
        let (expression, type_node) = (data.expression, data.type_node);
        let data_index = self.type_assertions.len() as u32;
        self.type_assertions.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(expression, parent);
        self.set_parent(type_node, parent);
        parent
    }

    pub fn add_template_expr(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: TemplateExprData,
    ) -> NodeIndex {
        let head = data.head;
        let spans = data.template_spans.clone();
        let data_index = self.template_exprs.len() as u32;
        self.template_exprs.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(head, parent);
        self.set_parent_list(&spans, parent);
        parent
    }

    pub fn add_template_span(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: TemplateSpanData,
    ) -> NodeIndex {
        let (expression, literal) = (data.expression, data.literal);
        let data_index = self.template_spans.len() as u32;
        self.template_spans.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(expression, parent);
        self.set_parent(literal, parent);
        parent
    }

    pub fn add_tagged_template(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: TaggedTemplateData,
    ) -> NodeIndex {
        let (tag, template) = (data.tag, data.template);
        let data_index = self.tagged_templates.len() as u32;
        self.tagged_templates.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(tag, parent);
        self.set_parent(template, parent);
        parent
    }

    /// Add a function-like node
    pub fn add_function(&mut self, kind: u16, pos: u32, end: u32, data: FunctionData) -> NodeIndex {
        let modifiers = data.modifiers.clone();
        let parameters = data.parameters.clone();
        let children = [
            data.name,
            data.type_parameters,
            data.type_annotation,
            data.body,
        ];
        let data_index = self.functions.len() as u32;
        self.functions.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent_opt_list(&modifiers, parent);
        self.set_parent_list(&parameters, parent);
        for child in children {
            self.set_parent(child, parent);
        }
        parent
    }

    /// Add a class declaration or expression
    pub fn add_class(&mut self, kind: u16, pos: u32, end: u32, data: ClassData) -> NodeIndex {
        let modifiers = data.modifiers.clone();
        let members = data.members.clone();
        let children = [data.name, data.type_parameters, data.heritage_clauses];
        let data_index = self.classes.len() as u32;
        self.classes.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent_opt_list(&modifiers, parent);
        self.set_parent_list(&members, parent);
        for child in children {
            self.set_parent(child, parent);
        }
        parent
    }

    pub fn add_parameter(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: ParameterData,
    ) -> NodeIndex {
        let modifiers = data.modifiers.clone();
        let children = [data.name, data.type_annotation, data.initializer];
        let data_index = self.parameters.len() as u32;
        self.parameters.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent_opt_list(&modifiers, parent);
        for child in children {
            self.set_parent(child, parent);
        }
        parent
    }

    pub fn add_property_decl(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: PropertyDeclData,
    ) -> NodeIndex {
        let modifiers = data.modifiers.clone();
        let children = [data.name, data.type_annotation, data.initializer];
        let data_index = self.property_decls.len() as u32;
        self.property_decls.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent_opt_list(&modifiers, parent);
        for child in children {
            self.set_parent(child, parent);
        }
        parent
    }

    /// Add a property or shorthand property assignment
    pub fn add_property_assignment(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: PropertyAssignmentData,
    ) -> NodeIndex {
        let (name, initializer) = (data.name, data.initializer);
        let data_index = self.property_assignments.len() as u32;
        self.property_assignments.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(name, parent);
        self.set_parent(initializer, parent);
        parent
    }

    /// Add an opaque text node (type syntax, verbatim declarations)
    pub fn add_type_node(&mut self, kind: u16, pos: u32, end: u32, data: TypeNodeData) -> NodeIndex {
        let data_index = self.type_nodes.len() as u32;
        self.type_nodes.push(data);
        self.push_node(kind, pos, end, data_index)
    }

    /// Add a block node
    pub fn add_block(&mut self, kind: u16, pos: u32, end: u32, data: BlockData) -> NodeIndex {
        let statements = data.statements.clone();
        let data_index = self.blocks.len() as u32;
        self.blocks.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent_list(&statements, parent);
        parent
    }

    /// Add a variable statement or declaration list
    pub fn add_variable_with_flags(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: VariableData,
        flags: u32,
    ) -> NodeIndex {
        let modifiers = data.modifiers.clone();
        let declarations = data.declarations.clone();
        let data_index = self.variables.len() as u32;
        self.variables.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_flags(parent, flags);
        self.set_parent_opt_list(&modifiers, parent);
        self.set_parent_list(&declarations, parent);
        parent
    }

    pub fn add_variable_declaration(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: VariableDeclarationData,
    ) -> NodeIndex {
        let children = [data.name, data.type_annotation, data.initializer];
        let data_index = self.variable_declarations.len() as u32;
        self.variable_declarations.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        for child in children {
            self.set_parent(child, parent);
        }
        parent
    }

    pub fn add_binding_pattern(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: BindingPatternData,
    ) -> NodeIndex {
        let elements = data.elements.clone();
        let data_index = self.binding_patterns.len() as u32;
        self.binding_patterns.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent_list(&elements, parent);
        parent
    }

    pub fn add_binding_element(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: BindingElementData,
    ) -> NodeIndex {
        let children = [data.property_name, data.name, data.initializer];
        let data_index = self.binding_elements.len() as u32;
        self.binding_elements.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        for child in children {
            self.set_parent(child, parent);
        }
        parent
    }

    pub fn add_expr_statement(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: ExprStatementData,
    ) -> NodeIndex {
        let expression = data.expression;
        let data_index = self.expr_statements.len() as u32;
        self.expr_statements.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(expression, parent);
        parent
    }

    /// Add a return or throw statement
    pub fn add_return(&mut self, kind: u16, pos: u32, end: u32, data: ReturnData) -> NodeIndex {
        let expression = data.expression;
        let data_index = self.return_data.len() as u32;
        self.return_data.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(expression, parent);
        parent
    }

    pub fn add_if_statement(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: IfStatementData,
    ) -> NodeIndex {
        let children = [data.expression, data.then_statement, data.else_statement];
        let data_index = self.if_statements.len() as u32;
        self.if_statements.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        for child in children {
            self.set_parent(child, parent);
        }
        parent
    }

    /// Add a for/while/do loop
    pub fn add_loop(&mut self, kind: u16, pos: u32, end: u32, data: LoopData) -> NodeIndex {
        let children = [
            data.initializer,
            data.condition,
            data.incrementor,
            data.statement,
        ];
        let data_index = self.loops.len() as u32;
        self.loops.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        for child in children {
            self.set_parent(child, parent);
        }
        parent
    }

    pub fn add_for_in_of(&mut self, kind: u16, pos: u32, end: u32, data: ForInOfData) -> NodeIndex {
        let children = [data.initializer, data.expression, data.statement];
        let data_index = self.for_in_of.len() as u32;
        self.for_in_of.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        for child in children {
            self.set_parent(child, parent);
        }
        parent
    }

    pub fn add_try(&mut self, kind: u16, pos: u32, end: u32, data: TryData) -> NodeIndex {
        let children = [data.try_block, data.catch_clause, data.finally_block];
        let data_index = self.try_data.len() as u32;
        self.try_data.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        for child in children {
            self.set_parent(child, parent);
        }
        parent
    }

    pub fn add_catch_clause(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: CatchClauseData,
    ) -> NodeIndex {
        let (variable, block) = (data.variable_declaration, data.block);
        let data_index = self.catch_clauses.len() as u32;
        self.catch_clauses.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(variable, parent);
        self.set_parent(block, parent);
        parent
    }

    pub fn add_switch(&mut self, kind: u16, pos: u32, end: u32, data: SwitchData) -> NodeIndex {
        let (expression, case_block) = (data.expression, data.case_block);
        let data_index = self.switch_data.len() as u32;
        self.switch_data.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(expression, parent);
        self.set_parent(case_block, parent);
        parent
    }

    /// Add a case or default clause
    pub fn add_case_clause(
        &mut self,
        kind: u16,
        pos: u32,
        end: u32,
        data: CaseClauseData,
    ) -> NodeIndex {
        let expression = data.expression;
        let statements = data.statements.clone();
        let data_index = self.case_clauses.len() as u32;
        self.case_clauses.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(expression, parent);
        self.set_parent_list(&statements, parent);
        parent
    }

    pub fn add_labeled(&mut self, kind: u16, pos: u32, end: u32, data: LabeledData) -> NodeIndex {
        let (label, statement) = (data.label, data.statement);
        let data_index = self.labeled_data.len() as u32;
        self.labeled_data.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(label, parent);
        self.set_parent(statement, parent);
        parent
    }

    /// Add a break or continue statement
    pub fn add_jump(&mut self, kind: u16, pos: u32, end: u32, data: JumpData) -> NodeIndex {
        let label = data.label;
        let data_index = self.jump_data.len() as u32;
        self.jump_data.push(data);
        let parent = self.push_node(kind, pos, end, data_index);
        self.set_parent(label, parent);
        parent
    }

    /// Add the source file node
    pub fn add_source_file(&mut self, pos: u32, end: u32, data: SourceFileData) -> NodeIndex {
        let statements = data.statements.clone();
        let eof = data.end_of_file_token;
        let data_index = self.source_files.len() as u32;
        self.source_files.push(data);
        let parent = self.push_node(
            super::syntax_kind_ext::SOURCE_FILE,
            pos,
            end,
            data_index,
        );
        self.set_parent_list(&statements, parent);
        self.set_parent(eof, parent);
        parent
    }
}
