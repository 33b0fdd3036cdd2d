pub mod dreams;
