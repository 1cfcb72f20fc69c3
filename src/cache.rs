//! Bounded memo table in front of the parser.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::{ast::Node, error::Result, parser::Parser, runtime::ExpressionParser};

/// Parser that remembers the trees of expressions it has already seen.
///
/// Hits only take the shared read lock. On a miss the write lock is held
/// while parsing, so two threads missing on the same text do not both insert.
/// Once the table grows past `capacity` it is cleared wholesale before the
/// next insertion. Expressions that fail to parse are never stored.
pub struct CachingParser {
    parser: Parser,
    capacity: usize,
    cache: RwLock<HashMap<String, Arc<Node>>>,
}

impl CachingParser {
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new(parser: Parser) -> Self {
        Self::with_capacity(parser, Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(parser: Parser, capacity: usize) -> Self {
        Self {
            parser,
            capacity,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn parse(&self, expression: &str) -> Result<Arc<Node>> {
        if let Ok(cache) = self.cache.read()
            && let Some(node) = cache.get(expression)
        {
            log::trace!("expression cache hit: `{}`", expression);
            return Ok(Arc::clone(node));
        }

        let Ok(mut cache) = self.cache.write() else {
            log::debug!("expression cache unavailable, parsing `{}` uncached", expression);
            return self.parser.parse(expression).map(Arc::new);
        };

        // Another thread may have filled the entry between the two locks.
        if let Some(node) = cache.get(expression) {
            return Ok(Arc::clone(node));
        }

        log::debug!("expression cache miss: `{}`", expression);
        let node = Arc::new(self.parser.parse(expression)?);
        if cache.len() > self.capacity {
            log::debug!("expression cache full ({} entries), clearing", cache.len());
            cache.clear();
        }
        cache.insert(expression.to_string(), Arc::clone(&node));
        Ok(node)
    }

    /// Number of cached trees.
    pub fn len(&self) -> usize {
        self.cache.read().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }
}

impl ExpressionParser for CachingParser {
    fn parse(&self, expression: &str) -> Result<Arc<Node>> {
        CachingParser::parse(self, expression)
    }
}
