use crate::foundation::error::AugmentResult;
use crate::foundation::image::ImageArray;

/// Holder of the current buffer for one pipeline invocation.
///
/// Transforms never touch the held buffer on their own: [`derive`](Self::derive) computes a
/// result from it, and only [`commit`](Self::commit) / [`apply`](Self::apply) replace it.
#[derive(Clone, Debug)]
pub struct TransformState {
    current: ImageArray,
}

impl TransformState {
    pub fn new(image: ImageArray) -> Self {
        Self { current: image }
    }

    pub fn current(&self) -> &ImageArray {
        &self.current
    }

    /// Run `op` on the current buffer without keeping the result.
    pub fn derive<F>(&self, op: F) -> AugmentResult<ImageArray>
    where
        F: FnOnce(&ImageArray) -> AugmentResult<ImageArray>,
    {
        op(&self.current)
    }

    /// Replace the held buffer.
    pub fn commit(&mut self, image: ImageArray) {
        self.current = image;
    }

    /// `derive` followed by `commit`.
    pub fn apply<F>(&mut self, op: F) -> AugmentResult<()>
    where
        F: FnOnce(&ImageArray) -> AugmentResult<ImageArray>,
    {
        let next = op(&self.current)?;
        self.current = next;
        Ok(())
    }

    /// Run an in-place operation on the held buffer.
    pub fn apply_in_place(&mut self, op: impl FnOnce(&mut ImageArray)) {
        op(&mut self.current);
    }

    pub fn into_inner(self) -> ImageArray {
        self.current
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/state.rs"]
mod tests;
