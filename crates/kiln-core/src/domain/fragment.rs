use std::borrow::Cow;
use std::cmp::Ordering;
use std::sync::Arc;

use bytes::Bytes;

use crate::domain::buffer_pool::{BufferPool, PooledBuffer};

/// Backing storage of a fragment's text.
#[derive(Debug)]
pub enum FragmentBytes {
    /// Leased from a [`BufferPool`]; returned when the fragment drops.
    Pooled(PooledBuffer),
    /// Owned outright.
    Owned(Bytes),
}

impl FragmentBytes {
    fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Pooled(buffer) => buffer.as_bytes(),
            Self::Owned(bytes) => bytes,
        }
    }
}

/// One unit of generated text waiting to be written.
///
/// A fragment is only ever built from `&str`, so its bytes are valid UTF-8.
#[derive(Debug)]
pub struct CodeFragment {
    file_name_hint: String,
    administrator: String,
    bytes: FragmentBytes,
}

impl CodeFragment {
    /// Copy `text` into a buffer leased from `pool`.
    pub fn pooled(
        pool: &Arc<BufferPool>,
        file_name_hint: impl Into<String>,
        administrator: impl Into<String>,
        text: &str,
    ) -> Self {
        let mut buffer = pool.lease(text.len());
        buffer.extend_from_slice(text.as_bytes());
        Self {
            file_name_hint: file_name_hint.into(),
            administrator: administrator.into(),
            bytes: FragmentBytes::Pooled(buffer),
        }
    }

    pub fn owned(
        file_name_hint: impl Into<String>,
        administrator: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            file_name_hint: file_name_hint.into(),
            administrator: administrator.into(),
            bytes: FragmentBytes::Owned(Bytes::from(text.into())),
        }
    }

    pub fn file_name_hint(&self) -> &str {
        &self.file_name_hint
    }

    /// Name of the administrator that produced this fragment.
    pub fn administrator(&self) -> &str {
        &self.administrator
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.bytes.as_bytes())
    }

    pub fn is_pooled(&self) -> bool {
        matches!(self.bytes, FragmentBytes::Pooled(_))
    }

    pub fn len(&self) -> usize {
        self.bytes.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total order used when draining, so output never depends on the order
    /// concurrent generators appended in.
    pub fn drain_order(&self, other: &Self) -> Ordering {
        self.file_name_hint
            .cmp(&other.file_name_hint)
            .then_with(|| self.administrator.cmp(&other.administrator))
            .then_with(|| self.bytes.as_bytes().cmp(other.bytes.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pooled_fragment_returns_buffer_on_drop() {
        let pool = BufferPool::new(32, 4);
        let fragment = CodeFragment::pooled(&pool, "A.cs", "test", "class A {}");
        assert!(fragment.is_pooled());
        assert_eq!(fragment.text(), "class A {}");
        assert_eq!(pool.stats().outstanding, 1);

        drop(fragment);
        assert_eq!(pool.stats().returned, 1);
    }

    #[test]
    fn owned_fragment_does_not_touch_pool() {
        let fragment = CodeFragment::owned("B.cs", "test", "class B {}");
        assert!(!fragment.is_pooled());
        assert_eq!(fragment.len(), 10);
    }

    #[test]
    fn drain_order_is_hint_then_administrator() {
        let a = CodeFragment::owned("A.cs", "zeta", "");
        let b = CodeFragment::owned("A.cs", "alpha", "");
        let c = CodeFragment::owned("B.cs", "alpha", "");

        let mut fragments = vec![c, a, b];
        fragments.sort_by(CodeFragment::drain_order);

        let order: Vec<_> = fragments
            .iter()
            .map(|f| (f.file_name_hint(), f.administrator()))
            .collect();
        assert_eq!(order, [("A.cs", "alpha"), ("A.cs", "zeta"), ("B.cs", "alpha")]);
    }
}
