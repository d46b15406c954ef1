//! Tools the expert's model can call.

pub mod base_tool;
pub mod base_toolset;
pub mod calculator;
pub mod document_search;

pub use base_tool::{BaseTool, FunctionDeclaration, ToolResult};
pub use base_toolset::{BaseToolset, SimpleToolset};
pub use calculator::{calculate, evaluate, CalcError, CalculatorTool};
pub use document_search::{DocumentSearch, DocumentSearchTool, HttpDocumentSearch, SEARCH_UNAVAILABLE};
