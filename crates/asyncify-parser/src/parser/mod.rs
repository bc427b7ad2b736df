//! Thin-node parser.

pub mod base;
pub use base::{NodeIndex, NodeList};

pub mod node;
pub use node::NodeArena;

mod node_access;
pub use node_access::NodeAccess;

mod node_arena;

pub mod state;
pub use state::{ParseDiagnostic, ParserState};

mod state_expressions;
mod state_statements;
mod state_types;

/// Node kinds that have no token counterpart.
///
/// Token-shaped nodes (identifiers, literals, `this`, `true`, ...) reuse
/// their `SyntaxKind` value; everything else lives above the token range.
pub mod syntax_kind_ext {
    pub const SOURCE_FILE: u16 = 300;
    // Names
    pub const COMPUTED_PROPERTY_NAME: u16 = 301;
    // Declarations and signature parts
    pub const PARAMETER: u16 = 302;
    pub const TYPE_NODE: u16 = 303;
    pub const PROPERTY_DECLARATION: u16 = 304;
    pub const METHOD_DECLARATION: u16 = 305;
    pub const CONSTRUCTOR: u16 = 306;
    pub const GET_ACCESSOR: u16 = 307;
    pub const SET_ACCESSOR: u16 = 308;
    pub const SEMICOLON_CLASS_ELEMENT: u16 = 309;
    // Binding patterns
    pub const OBJECT_BINDING_PATTERN: u16 = 310;
    pub const ARRAY_BINDING_PATTERN: u16 = 311;
    pub const BINDING_ELEMENT: u16 = 312;
    // Expressions
    pub const ARRAY_LITERAL_EXPRESSION: u16 = 320;
    pub const OBJECT_LITERAL_EXPRESSION: u16 = 321;
    pub const PROPERTY_ACCESS_EXPRESSION: u16 = 322;
    pub const ELEMENT_ACCESS_EXPRESSION: u16 = 323;
    pub const CALL_EXPRESSION: u16 = 324;
    pub const NEW_EXPRESSION: u16 = 325;
    pub const TAGGED_TEMPLATE_EXPRESSION: u16 = 326;
    pub const PARENTHESIZED_EXPRESSION: u16 = 327;
    pub const FUNCTION_EXPRESSION: u16 = 328;
    pub const ARROW_FUNCTION: u16 = 329;
    pub const DELETE_EXPRESSION: u16 = 330;
    pub const TYPE_OF_EXPRESSION: u16 = 331;
    pub const VOID_EXPRESSION: u16 = 332;
    pub const AWAIT_EXPRESSION: u16 = 333;
    pub const PREFIX_UNARY_EXPRESSION: u16 = 334;
    pub const POSTFIX_UNARY_EXPRESSION: u16 = 335;
    pub const BINARY_EXPRESSION: u16 = 336;
    pub const CONDITIONAL_EXPRESSION: u16 = 337;
    pub const TEMPLATE_EXPRESSION: u16 = 338;
    pub const YIELD_EXPRESSION: u16 = 339;
    pub const SPREAD_ELEMENT: u16 = 340;
    pub const CLASS_EXPRESSION: u16 = 341;
    pub const OMITTED_EXPRESSION: u16 = 342;
    pub const AS_EXPRESSION: u16 = 343;
    pub const SATISFIES_EXPRESSION: u16 = 344;
    pub const NON_NULL_EXPRESSION: u16 = 345;
    pub const TEMPLATE_SPAN: u16 = 346;
    // Object literal members
    pub const PROPERTY_ASSIGNMENT: u16 = 350;
    pub const SHORTHAND_PROPERTY_ASSIGNMENT: u16 = 351;
    pub const SPREAD_ASSIGNMENT: u16 = 352;
    // Statements
    pub const BLOCK: u16 = 360;
    pub const EMPTY_STATEMENT: u16 = 361;
    pub const VARIABLE_STATEMENT: u16 = 362;
    pub const EXPRESSION_STATEMENT: u16 = 363;
    pub const IF_STATEMENT: u16 = 364;
    pub const DO_STATEMENT: u16 = 365;
    pub const WHILE_STATEMENT: u16 = 366;
    pub const FOR_STATEMENT: u16 = 367;
    pub const FOR_IN_STATEMENT: u16 = 368;
    pub const FOR_OF_STATEMENT: u16 = 369;
    pub const CONTINUE_STATEMENT: u16 = 370;
    pub const BREAK_STATEMENT: u16 = 371;
    pub const RETURN_STATEMENT: u16 = 372;
    pub const SWITCH_STATEMENT: u16 = 373;
    pub const LABELED_STATEMENT: u16 = 374;
    pub const THROW_STATEMENT: u16 = 375;
    pub const TRY_STATEMENT: u16 = 376;
    pub const DEBUGGER_STATEMENT: u16 = 377;
    pub const VARIABLE_DECLARATION: u16 = 378;
    pub const VARIABLE_DECLARATION_LIST: u16 = 379;
    pub const FUNCTION_DECLARATION: u16 = 380;
    pub const CLASS_DECLARATION: u16 = 381;
    pub const CASE_BLOCK: u16 = 382;
    pub const CASE_CLAUSE: u16 = 383;
    pub const DEFAULT_CLAUSE: u16 = 384;
    pub const CATCH_CLAUSE: u16 = 385;
    // Declarations kept as source text
    pub const INTERFACE_DECLARATION: u16 = 390;
    pub const TYPE_ALIAS_DECLARATION: u16 = 391;
    pub const ENUM_DECLARATION: u16 = 392;
    pub const MODULE_DECLARATION: u16 = 393;
    pub const IMPORT_DECLARATION: u16 = 394;
    pub const EXPORT_DECLARATION: u16 = 395;
    pub const EXPORT_ASSIGNMENT: u16 = 396;
}

/// Packed `Node::flags` bits.
pub mod node_flags {
    pub const NONE: u32 = 0;
    pub const LET: u32 = 1 << 0;
    pub const CONST: u32 = 1 << 1;
    pub const OPTIONAL_CHAIN: u32 = 1 << 2;
    /// Created by a transform rather than the parser.
    pub const SYNTHESIZED: u32 = 1 << 3;
    /// Parenthesized arrow parameter list.
    pub const PARENTHESIZED_PARAMETERS: u32 = 1 << 4;
    pub const BLOCK_SCOPED: u32 = LET | CONST;
}
