pub mod graph;

pub use graph::{
    create_graph, CatalogFinder, ConversationGraph, ConversationState, MockFinder, PartFinder,
    Step,
};
