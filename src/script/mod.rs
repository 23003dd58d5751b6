pub(crate) mod command;
pub(crate) mod lines;
pub(crate) mod locate;
pub(crate) mod parser;
