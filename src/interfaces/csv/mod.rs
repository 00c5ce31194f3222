pub mod turn_reader;
