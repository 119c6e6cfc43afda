use crate::{End, Extras, Feat, FeatOp, PhraseRef, StageOp, Start, StartShape, TagImpl};
use std::ops::BitOr;

impl<TTag: TagImpl> Default for Feat<TTag> {
    fn default() -> Self {
        Self {
            left: Vec::new(),
            right: Vec::new(),
            right_width: 0,
            forward: None,
            staging_right: false,
        }
    }
}

impl<TTag: TagImpl> Feat<TTag> {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, op: FeatOp<TTag>) {
        match op {
            FeatOp::LStrip(n) => self.left.push(StageOp::Strip(n)),
            FeatOp::RTokenize(n) => {
                self.right.push(StageOp::Strip(n));
                self.right_width += n;
                self.staging_right = true;
            }
            FeatOp::SwitchTo(phrase) => {
                let op = StageOp::Switch(phrase);
                if self.staging_right {
                    self.right.push(op)
                } else {
                    self.left.push(op)
                }
            }
            FeatOp::SwitchPh(phrase) => {
                let op = StageOp::SwitchParent(phrase);
                if self.staging_right {
                    self.right.push(op)
                } else {
                    self.left.push(op)
                }
            }
            FeatOp::ForwardTo(phrase) => self.forward = Some(phrase),
        }
    }

    pub(crate) fn has_switch_parent(&self) -> bool {
        self.left
            .iter()
            .chain(self.right.iter())
            .any(|op| matches!(op, StageOp::SwitchParent(_)))
    }

    /// Append a left-strip of `n` bytes ([FeatOp::LStrip]).
    pub fn lstrip(mut self, n: usize) -> Self {
        self.push(FeatOp::LStrip(n));
        self
    }

    /// Append a right-tokenize of `n` bytes ([FeatOp::RTokenize]).
    pub fn rtokenize(mut self, n: usize) -> Self {
        self.push(FeatOp::RTokenize(n));
        self
    }

    /// Append a phrase switch at the current staging point ([FeatOp::SwitchTo]).
    pub fn switch_to(mut self, phrase: &PhraseRef<TTag>) -> Self {
        self.push(FeatOp::SwitchTo(phrase.clone()));
        self
    }

    /// Append a parent phrase switch ([FeatOp::SwitchPh], node candidates only).
    pub fn switch_ph(mut self, phrase: &PhraseRef<TTag>) -> Self {
        self.push(FeatOp::SwitchPh(phrase.clone()));
        self
    }

    /// Set the terminal forward query ([FeatOp::ForwardTo]).
    pub fn forward_to(mut self, phrase: &PhraseRef<TTag>) -> Self {
        self.push(FeatOp::ForwardTo(phrase.clone()));
        self
    }
}

impl<TTag: TagImpl> From<FeatOp<TTag>> for Feat<TTag> {
    fn from(op: FeatOp<TTag>) -> Self {
        let mut feat = Feat::new();
        feat.push(op);
        feat
    }
}

impl<TTag: TagImpl> BitOr<FeatOp<TTag>> for FeatOp<TTag> {
    type Output = Feat<TTag>;

    fn bitor(self, rhs: FeatOp<TTag>) -> Feat<TTag> {
        Feat::from(self) | rhs
    }
}

impl<TTag: TagImpl> BitOr<FeatOp<TTag>> for Feat<TTag> {
    type Output = Feat<TTag>;

    fn bitor(mut self, rhs: FeatOp<TTag>) -> Feat<TTag> {
        self.push(rhs);
        self
    }
}

impl<TTag: TagImpl> Start<TTag> {
    fn raw(shape: StartShape, instant: bool, tag: TTag, at: usize, to: usize) -> Self {
        Self {
            shape,
            instant,
            at,
            to,
            tag,
            features: Feat::default(),
            extras: Extras::default(),
        }
    }

    /// A standalone content token candidate covering `unparsed[at..to]`.
    pub fn token(tag: TTag, at: usize, to: usize) -> Self {
        Self::raw(StartShape::Token, false, tag, at, to)
    }

    /// A node start candidate covering `unparsed[at..to]`.
    pub fn node(tag: TTag, at: usize, to: usize) -> Self {
        Self::raw(StartShape::Node, false, tag, at, to)
    }

    /// A standalone token candidate which bypasses priority arbitration.
    pub fn instant_token(tag: TTag, at: usize, to: usize) -> Self {
        Self::raw(StartShape::Token, true, tag, at, to)
    }

    /// A node start candidate which bypasses priority arbitration.
    pub fn instant_node(tag: TTag, at: usize, to: usize) -> Self {
        Self::raw(StartShape::Node, true, tag, at, to)
    }

    /// A masking candidate: the span is inert content of the *current* node, not the
    /// beginning of this phrase. Never present in the result.
    pub fn mask(at: usize, to: usize) -> Self {
        Self::raw(StartShape::Mask, false, TTag::plain(), at, to)
    }

    /// A masking node candidate: masks from `at` until the phrase's `ends` matches,
    /// possibly across rows. Never present in the result.
    pub fn mask_node(at: usize, to: usize) -> Self {
        Self::raw(StartShape::MaskNode, false, TTag::plain(), at, to)
    }

    /// Attach a feature pipeline.
    pub fn features(mut self, features: impl Into<Feat<TTag>>) -> Self {
        self.features = features.into();
        self
    }

    /// Store a value in the extras of the node this candidate opens.
    pub fn extra<V: 'static>(mut self, key: impl Into<String>, value: V) -> Self {
        self.extras.set(key, value);
        self
    }

    /// Append a left-strip to the candidate's pipeline.
    pub fn lstrip(mut self, n: usize) -> Self {
        self.features.push(FeatOp::LStrip(n));
        self
    }

    /// Append a right-tokenize to the candidate's pipeline.
    pub fn rtokenize(mut self, n: usize) -> Self {
        self.features.push(FeatOp::RTokenize(n));
        self
    }

    /// Append a phrase switch to the candidate's pipeline.
    pub fn switch_to(mut self, phrase: &PhraseRef<TTag>) -> Self {
        self.features.push(FeatOp::SwitchTo(phrase.clone()));
        self
    }

    /// Append a parent phrase switch to the candidate's pipeline.
    pub fn switch_ph(mut self, phrase: &PhraseRef<TTag>) -> Self {
        self.features.push(FeatOp::SwitchPh(phrase.clone()));
        self
    }

    /// Set the terminal forward query of the candidate's pipeline.
    pub fn forward_to(mut self, phrase: &PhraseRef<TTag>) -> Self {
        self.features.push(FeatOp::ForwardTo(phrase.clone()));
        self
    }

    pub fn at(&self) -> usize {
        self.at
    }

    pub fn to(&self) -> usize {
        self.to
    }

    pub(crate) fn designated(&self) -> usize {
        self.to - self.at
    }

    pub(crate) fn is_node(&self) -> bool {
        matches!(self.shape, StartShape::Node | StartShape::MaskNode)
    }

    pub(crate) fn is_mask(&self) -> bool {
        matches!(self.shape, StartShape::Mask | StartShape::MaskNode)
    }
}

impl<TTag: TagImpl> End<TTag> {
    /// An end candidate covering `unparsed[at..to]`.
    pub fn new(tag: TTag, at: usize, to: usize) -> Self {
        Self {
            instant: false,
            at,
            to,
            tag,
            features: Feat::default(),
        }
    }

    /// A zero-width end candidate which bypasses priority arbitration; closes the node
    /// immediately without consuming content.
    pub fn instant(tag: TTag) -> Self {
        Self {
            instant: true,
            at: 0,
            to: 0,
            tag,
            features: Feat::default(),
        }
    }

    /// An end candidate which bypasses priority arbitration but still designates
    /// `unparsed[at..to]`.
    pub fn instant_spanned(tag: TTag, at: usize, to: usize) -> Self {
        Self {
            instant: true,
            at,
            to,
            tag,
            features: Feat::default(),
        }
    }

    /// Attach a feature pipeline.
    pub fn features(mut self, features: impl Into<Feat<TTag>>) -> Self {
        self.features = features.into();
        self
    }

    /// Append a left-strip to the candidate's pipeline.
    pub fn lstrip(mut self, n: usize) -> Self {
        self.features.push(FeatOp::LStrip(n));
        self
    }

    /// Append a right-tokenize to the candidate's pipeline.
    pub fn rtokenize(mut self, n: usize) -> Self {
        self.features.push(FeatOp::RTokenize(n));
        self
    }

    /// Append a phrase switch to the candidate's pipeline.
    pub fn switch_to(mut self, phrase: &PhraseRef<TTag>) -> Self {
        self.features.push(FeatOp::SwitchTo(phrase.clone()));
        self
    }

    /// Set the terminal forward query of the candidate's pipeline.
    pub fn forward_to(mut self, phrase: &PhraseRef<TTag>) -> Self {
        self.features.push(FeatOp::ForwardTo(phrase.clone()));
        self
    }

    pub fn at(&self) -> usize {
        self.at
    }

    pub fn to(&self) -> usize {
        self.to
    }

    pub(crate) fn designated(&self) -> usize {
        self.to - self.at
    }
}

#[cfg(test)]
mod tests {
    use crate::{Feat, FeatOp, StageOp};

    #[test]
    fn switches_stage_left_until_first_rtokenize() {
        let feat: Feat<i8> = Feat::new().lstrip(2).rtokenize(3).lstrip(1).rtokenize(2);
        assert_eq!(feat.left.len(), 2, "lstrips always stage left");
        assert_eq!(feat.right.len(), 2);
        assert_eq!(feat.right_width, 5);
    }

    #[test]
    fn pipe_composition_matches_builder() {
        let piped: Feat<i8> = FeatOp::LStrip(1) | FeatOp::RTokenize(2) | FeatOp::LStrip(3);
        let built: Feat<i8> = Feat::new().lstrip(1).rtokenize(2).lstrip(3);
        let widths = |f: &Feat<i8>| {
            let strip = |ops: &[StageOp<i8>]| {
                ops.iter()
                    .map(|op| match op {
                        StageOp::Strip(n) => *n,
                        _ => 0,
                    })
                    .collect::<Vec<_>>()
            };
            (strip(&f.left), strip(&f.right), f.right_width)
        };
        assert_eq!(widths(&piped), widths(&built));
    }
}
