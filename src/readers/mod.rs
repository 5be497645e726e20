pub mod envista_reader;

pub use envista_reader::EnvistaReader;
