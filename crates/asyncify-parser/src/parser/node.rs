//! Thin Node Architecture for Cache-Efficient AST
//!
//! Each node is a 16-byte header (`Node`) holding kind, flags, position and
//! an index into a typed data pool. The pool is selected by `kind`.
//!
//! Nodes are append-only: a transform that needs a modified tree clones the
//! arena and appends new nodes, recording the node each one derives from in
//! `ExtendedNodeInfo::original`.

use super::base::{NodeIndex, NodeList};
use serde::{Deserialize, Serialize};

/// A thin 16-byte node header for cache-efficient AST storage.
///
/// Layout (16 bytes total):
/// - `kind`: 2 bytes (SyntaxKind value or `syntax_kind_ext` constant)
/// - `flags`: 2 bytes (packed `node_flags`)
/// - `pos`: 4 bytes (start position in source)
/// - `end`: 4 bytes (end position in source)
/// - `data_index`: 4 bytes (index into type-specific pool, u32::MAX = no data)
#[repr(C)]
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Node {
    pub kind: u16,
    pub flags: u16,
    pub pos: u32,
    pub end: u32,
    pub data_index: u32,
}

impl Node {
    pub const NO_DATA: u32 = u32::MAX;

    /// Create a new thin node with data index
    #[inline]
    pub fn with_data(kind: u16, pos: u32, end: u32, data_index: u32) -> Node {
        Node {
            kind,
            flags: 0,
            pos,
            end,
            data_index,
        }
    }

    /// Check if this node has associated data
    #[inline]
    pub fn has_data(&self) -> bool {
        self.data_index != Self::NO_DATA
    }

    #[inline]
    pub fn has_flag(&self, flag: u32) -> bool {
        (self.flags as u32) & flag != 0
    }
}

// =============================================================================
// Typed Data Pools
// =============================================================================

/// Data for identifier nodes (Identifier, PrivateIdentifier)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdentifierData {
    pub escaped_text: String,
}

/// Data for literals (string, numeric, bigint, regex, template parts)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LiteralData {
    /// Cooked value for strings and templates, source text otherwise
    pub text: String,
    /// Exact source text, including quotes and template delimiters
    pub raw_text: Option<String>,
}

/// Data for binary expressions
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BinaryExprData {
    pub left: NodeIndex,
    pub operator_token: u16, // SyntaxKind
    pub right: NodeIndex,
}

/// Data for prefix/postfix unary expressions
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnaryExprData {
    pub operator: u16, // SyntaxKind
    pub operand: NodeIndex,
}

/// Data for await/typeof/void/delete/spread/non-null/yield expressions
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnaryExprDataEx {
    pub expression: NodeIndex,
    pub asterisk_token: bool, // For yield*
}

/// Data for call/new expressions
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallExprData {
    pub expression: NodeIndex,
    pub type_arguments: NodeIndex,
    /// `None` only for `new X` without an argument list
    pub arguments: Option<NodeList>,
}

/// Data for property/element access
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessExprData {
    pub expression: NodeIndex,
    pub name_or_argument: NodeIndex,
    pub question_dot_token: bool,
}

/// Data for conditional expressions (a ? b : c)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConditionalExprData {
    pub condition: NodeIndex,
    pub when_true: NodeIndex,
    pub when_false: NodeIndex,
}

/// Data for object/array literals
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LiteralExprData {
    pub elements: NodeList,
    pub multi_line: bool,
}

/// Data for parenthesized expressions
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParenthesizedData {
    pub expression: NodeIndex,
}

/// Data for as/satisfies expressions
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypeAssertionData {
    pub expression: NodeIndex,
    pub type_node: NodeIndex,
}

/// Data for template expressions
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateExprData {
    pub head: NodeIndex,
    pub template_spans: NodeList,
}

/// Data for template spans
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateSpanData {
    pub expression: NodeIndex,
    pub literal: NodeIndex,
}

/// Data for tagged templates
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaggedTemplateData {
    pub tag: NodeIndex,
    pub template: NodeIndex,
}

/// Data for every function-like node: declarations, expressions, arrows,
/// methods, constructors and accessors
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FunctionData {
    pub modifiers: Option<NodeList>,
    pub is_async: bool,       // Async function
    pub asterisk_token: bool, // Generator function
    pub name: NodeIndex,
    pub type_parameters: NodeIndex,
    pub parameters: NodeList,
    pub type_annotation: NodeIndex,
    pub body: NodeIndex,
}

/// Data for class declarations and expressions
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassData {
    pub modifiers: Option<NodeList>,
    pub name: NodeIndex,
    pub type_parameters: NodeIndex,
    /// `extends`/`implements` clauses kept as a single text node
    pub heritage_clauses: NodeIndex,
    pub members: NodeList,
}

/// Data for parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterData {
    pub modifiers: Option<NodeList>,
    pub dot_dot_dot_token: bool,
    pub name: NodeIndex,
    pub question_token: bool,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
}

/// Data for class property declarations
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropertyDeclData {
    pub modifiers: Option<NodeList>,
    pub name: NodeIndex,
    pub question_token: bool,
    pub exclamation_token: bool,
    pub type_annotation: NodeIndex,
    pub initializer: NodeIndex,
}

/// Data for property assignments (`initializer` is NONE for shorthand)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropertyAssignmentData {
    pub name: NodeIndex,
    pub initializer: NodeIndex,
}

/// Data for computed property names
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComputedPropertyData {
    pub expression: NodeIndex,
}

/// Data for opaque type syntax and declarations kept verbatim
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypeNodeData {
    pub text: String,
}

/// Data for block statements, case clauses' bodies and source files
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockData {
    pub statements: NodeList,
    pub multi_line: bool,
}

/// Data for variable statements and declaration lists.
/// `let`/`const` are carried in the node flags.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VariableData {
    pub modifiers: Option<NodeList>,
    pub declarations: NodeList,
}

/// Data for variable declarations (individual)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VariableDeclarationData {
    pub name: NodeIndex,            // Identifier or BindingPattern
    pub exclamation_token: bool,    // Definite assignment assertion
    pub type_annotation: NodeIndex, // TypeNode (optional)
    pub initializer: NodeIndex,     // Expression (optional)
}

/// Data for binding patterns
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BindingPatternData {
    pub elements: NodeList,
}

/// Data for binding elements
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BindingElementData {
    pub dot_dot_dot_token: bool,
    pub property_name: NodeIndex,
    pub name: NodeIndex,
    pub initializer: NodeIndex,
}

/// Data for expression statements and `export default` assignments
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExprStatementData {
    pub expression: NodeIndex,
}

/// Data for return/throw statements
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReturnData {
    pub expression: NodeIndex,
}

/// Data for if statements
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IfStatementData {
    pub expression: NodeIndex,
    pub then_statement: NodeIndex,
    pub else_statement: NodeIndex,
}

/// Data for for/while/do loops
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoopData {
    pub initializer: NodeIndex,
    pub condition: NodeIndex,
    pub incrementor: NodeIndex,
    pub statement: NodeIndex,
}

/// Data for for-in/for-of statements
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ForInOfData {
    pub await_modifier: bool,   // For for-await-of
    pub initializer: NodeIndex, // Variable declaration list or expression
    pub expression: NodeIndex,  // The iterable expression
    pub statement: NodeIndex,   // The loop body
}

/// Data for try statements
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TryData {
    pub try_block: NodeIndex,
    pub catch_clause: NodeIndex,
    pub finally_block: NodeIndex,
}

/// Data for catch clauses
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatchClauseData {
    pub variable_declaration: NodeIndex,
    pub block: NodeIndex,
}

/// Data for switch statements
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SwitchData {
    pub expression: NodeIndex,
    pub case_block: NodeIndex,
}

/// Data for case/default clauses
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseClauseData {
    pub expression: NodeIndex, // NONE for default clause
    pub statements: NodeList,
}

/// Data for labeled statements
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LabeledData {
    pub label: NodeIndex,
    pub statement: NodeIndex,
}

/// Data for break/continue statements
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JumpData {
    pub label: NodeIndex,
}

/// Data for the source file node
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceFileData {
    pub statements: NodeList,
    pub end_of_file_token: NodeIndex,
    pub file_name: String,
}

/// Extended node info for nodes that need more than what fits in Node
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ExtendedNodeInfo {
    pub parent: NodeIndex,
    /// The node this one was cloned or derived from; NONE for parsed nodes
    pub original: NodeIndex,
}

impl Default for ExtendedNodeInfo {
    fn default() -> Self {
        ExtendedNodeInfo {
            parent: NodeIndex::NONE,
            original: NodeIndex::NONE,
        }
    }
}

/// Arena of thin nodes and their typed data pools.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    pub nodes: Vec<Node>,
    pub extended_info: Vec<ExtendedNodeInfo>,

    // Names and literals
    pub identifiers: Vec<IdentifierData>,
    pub literals: Vec<LiteralData>,
    pub computed_properties: Vec<ComputedPropertyData>,

    // Expressions
    pub binary_exprs: Vec<BinaryExprData>,
    pub unary_exprs: Vec<UnaryExprData>,
    pub unary_exprs_ex: Vec<UnaryExprDataEx>,
    pub call_exprs: Vec<CallExprData>,
    pub access_exprs: Vec<AccessExprData>,
    pub conditional_exprs: Vec<ConditionalExprData>,
    pub literal_exprs: Vec<LiteralExprData>,
    pub parenthesized: Vec<ParenthesizedData>,
    pub type_assertions: Vec<TypeAssertionData>,
    pub template_exprs: Vec<TemplateExprData>,
    pub template_spans: Vec<TemplateSpanData>,
    pub tagged_templates: Vec<TaggedTemplateData>,

    // Functions and classes
    pub functions: Vec<FunctionData>,
    pub classes: Vec<ClassData>,
    pub parameters: Vec<ParameterData>,
    pub property_decls: Vec<PropertyDeclData>,
    pub property_assignments: Vec<PropertyAssignmentData>,

    // Types and verbatim declarations
    pub type_nodes: Vec<TypeNodeData>,

    // Statements
    pub blocks: Vec<BlockData>,
    pub variables: Vec<VariableData>,
    pub variable_declarations: Vec<VariableDeclarationData>,
    pub binding_patterns: Vec<BindingPatternData>,
    pub binding_elements: Vec<BindingElementData>,
    pub expr_statements: Vec<ExprStatementData>,
    pub return_data: Vec<ReturnData>,
    pub if_statements: Vec<IfStatementData>,
    pub loops: Vec<LoopData>,
    pub for_in_of: Vec<ForInOfData>,
    pub try_data: Vec<TryData>,
    pub catch_clauses: Vec<CatchClauseData>,
    pub switch_data: Vec<SwitchData>,
    pub case_clauses: Vec<CaseClauseData>,
    pub labeled_data: Vec<LabeledData>,
    pub jump_data: Vec<JumpData>,

    // Source file
    pub source_files: Vec<SourceFileData>,
}
