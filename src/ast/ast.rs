use std::rc::Rc;

use super::statements::Stmt;

/// The parse result of one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub file: Rc<String>,
    pub body: Vec<Stmt>,
}

impl Module {
    pub fn iter(&self) -> std::slice::Iter<'_, Stmt> {
        self.body.iter()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}
