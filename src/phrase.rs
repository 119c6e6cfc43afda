use crate::parser::Parser;
use crate::{
    End, IPhrase, ITokenIndex, Log, ParseError, Phrase, PhraseRef, Root, Start, StreamView,
    SyntaxTree, TagImpl, TokenArena, TokenizeStream,
};
use once_cell::unsync::OnceCell;
use std::cell::{Ref, RefCell};
use std::marker::PhantomData;
use std::rc::Rc;

fn link<TTag: TagImpl>(list: &RefCell<Vec<PhraseRef<TTag>>>, phrase: &PhraseRef<TTag>) {
    assert!(
        !phrase.is_root,
        "{:?} (Root) added as a sub- or suffix-phrase",
        phrase.id()
    );
    let mut list = list.borrow_mut();
    if !list.iter().any(|p| Rc::ptr_eq(p, phrase)) {
        list.push(phrase.clone());
    }
}

fn unlink<TTag: TagImpl>(list: &RefCell<Vec<PhraseRef<TTag>>>, phrase: &PhraseRef<TTag>) {
    list.borrow_mut().retain(|p| !Rc::ptr_eq(p, phrase));
}

impl<TTag: TagImpl> Phrase<TTag> {
    /// Wrap a phrase kernel into a shareable graph node.
    pub fn new(kernel: impl IPhrase<TTag> + 'static) -> PhraseRef<TTag> {
        Self::with_kernel(Rc::new(kernel), false)
    }

    pub(crate) fn with_kernel(kernel: Rc<dyn IPhrase<TTag>>, is_root: bool) -> PhraseRef<TTag> {
        let phrase = Rc::new(Phrase {
            kernel,
            subs: RefCell::new(Vec::new()),
            suffixes: RefCell::new(Vec::new()),
            log: OnceCell::new(),
            this: OnceCell::new(),
            is_root,
        });
        if phrase.this.set(Rc::downgrade(&phrase)).is_err() {
            unreachable!("self reference is only assigned here");
        }
        phrase
    }

    /// Identity of the phrase (delegated to the kernel).
    pub fn id(&self) -> &'static str {
        self.kernel.id()
    }

    /// Set a log label to debug the phrase. Based on the level of the [Log], candidate
    /// queries of this phrase will be reported.
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    fn this_ref(&self) -> PhraseRef<TTag> {
        self.this
            .get()
            .and_then(|weak| weak.upgrade())
            .expect("phrases are always constructed behind Rc")
    }

    /// Add one or more sub phrases: phrases that may start *inside* this phrase.
    ///
    /// Self references are permitted and create recursive parsing. Panics when the root
    /// phrase is passed.
    pub fn add_subs(&self, phrases: &[&PhraseRef<TTag>]) -> &Self {
        for &phrase in phrases {
            link(&self.subs, phrase);
        }
        self
    }

    /// Add one or more sub phrases bidirectionally: each passed phrase also receives
    /// this phrase as a sub.
    pub fn add_subs_mutual(&self, phrases: &[&PhraseRef<TTag>]) -> &Self {
        let this = self.this_ref();
        for &phrase in phrases {
            link(&self.subs, phrase);
            link(&phrase.subs, &this);
        }
        self
    }

    /// Remove one or more phrases from the sub set.
    pub fn rm_subs(&self, phrases: &[&PhraseRef<TTag>]) -> &Self {
        for &phrase in phrases {
            unlink(&self.subs, phrase);
        }
        self
    }

    /// Remove one or more phrases from the sub set bidirectionally.
    pub fn rm_subs_mutual(&self, phrases: &[&PhraseRef<TTag>]) -> &Self {
        let this = self.this_ref();
        for &phrase in phrases {
            unlink(&self.subs, phrase);
            unlink(&phrase.subs, &this);
        }
        self
    }

    /// Add one or more suffix phrases: phrases that are offered once, directly after
    /// this phrase's end, and must start contiguously (`at == 0`).
    pub fn add_suffixes(&self, phrases: &[&PhraseRef<TTag>]) -> &Self {
        for &phrase in phrases {
            link(&self.suffixes, phrase);
        }
        self
    }

    /// Remove one or more phrases from the suffix set.
    pub fn rm_suffixes(&self, phrases: &[&PhraseRef<TTag>]) -> &Self {
        for &phrase in phrases {
            unlink(&self.suffixes, phrase);
        }
        self
    }

    /// Snapshot of the sub-phrase set.
    pub fn sub_phrases(&self) -> Vec<PhraseRef<TTag>> {
        self.subs.borrow().clone()
    }

    /// Snapshot of the suffix-phrase set.
    pub fn suffix_phrases(&self) -> Vec<PhraseRef<TTag>> {
        self.suffixes.borrow().clone()
    }

    pub(crate) fn subs_ref(&self) -> Ref<'_, Vec<PhraseRef<TTag>>> {
        self.subs.borrow()
    }

    pub(crate) fn suffix_snapshot(&self) -> Vec<PhraseRef<TTag>> {
        self.suffixes.borrow().clone()
    }

    pub(crate) fn query_starts(&self, view: &StreamView) -> Option<Start<TTag>> {
        let result = self.kernel.starts(view);
        #[cfg(debug_assertions)]
        if let Some(label) = self.log.get() {
            match &result {
                Some(item) if label.reports_success() => println!(
                    "[{}; StartCandidate]: {}..{} at row {} col {}",
                    label,
                    item.at,
                    item.to,
                    view.row_no(),
                    view.viewpoint()
                ),
                None if label.reports_failure() => println!(
                    "[{}; NoStart]: at row {} col {}",
                    label,
                    view.row_no(),
                    view.viewpoint()
                ),
                _ => {}
            }
        }
        result
    }

    pub(crate) fn query_ends(&self, view: &StreamView) -> Option<End<TTag>> {
        let result = self.kernel.ends(view);
        #[cfg(debug_assertions)]
        if let Some(label) = self.log.get() {
            match &result {
                Some(item) if label.reports_success() => println!(
                    "[{}; EndCandidate]: {}..{} at row {} col {}",
                    label,
                    item.at,
                    item.to,
                    view.row_no(),
                    view.viewpoint()
                ),
                None if label.reports_failure() => println!(
                    "[{}; NoEnd]: at row {} col {}",
                    label,
                    view.row_no(),
                    view.viewpoint()
                ),
                _ => {}
            }
        }
        result
    }

    pub(crate) fn has_tokenize(&self) -> bool {
        self.kernel.has_tokenize()
    }

    pub(crate) fn run_tokenize(&self, stream: &mut TokenizeStream) -> TTag {
        self.kernel.tokenize(stream)
    }

    pub(crate) fn default_tag(&self) -> TTag {
        self.kernel.default_tag()
    }

    pub(crate) fn at_start(&self, view: &StreamView, extras: &mut crate::Extras) {
        self.kernel.at_start(view, extras);
    }

    pub(crate) fn at_end(&self, view: &StreamView, extras: &mut crate::Extras) {
        self.kernel.at_end(view, extras);
    }
}

struct RootKernel<TTag: TagImpl>(PhantomData<TTag>);

impl<TTag: TagImpl> IPhrase<TTag> for RootKernel<TTag> {
    fn id(&self) -> &'static str {
        "root"
    }

    fn starts(&self, _: &StreamView) -> Option<Start<TTag>> {
        unreachable!("Root cannot be queried for a start")
    }
}

impl<TTag: TagImpl + 'static, TIdx: ITokenIndex<TTag> + Default> Root<TTag, TIdx> {
    /// Create a parsing root without any sub phrases.
    pub fn new() -> Self {
        Self::from_kernel(RootKernel(PhantomData))
    }

    /// Create a parsing root with a custom kernel, e.g. to give untokenized top-level
    /// content a dedicated [tokenize](IPhrase::tokenize) or
    /// [default_tag](IPhrase::default_tag). The kernel's `starts`/`ends` are never
    /// called.
    pub fn from_kernel(kernel: impl IPhrase<TTag> + 'static) -> Self {
        Self {
            phrase: Phrase::with_kernel(Rc::new(kernel), true),
            _index: PhantomData,
        }
    }

    /// The root's phrase graph node; usable as a switch target
    /// ([FeatOp::SwitchTo](crate::FeatOp::SwitchTo)).
    pub fn phrase(&self) -> &PhraseRef<TTag> {
        &self.phrase
    }

    /// Add one or more sub phrases to the root.
    pub fn add_subs(&self, phrases: &[&PhraseRef<TTag>]) -> &Self {
        self.phrase.add_subs(phrases);
        self
    }

    /// Remove one or more phrases from the root.
    pub fn rm_subs(&self, phrases: &[&PhraseRef<TTag>]) -> &Self {
        self.phrase.rm_subs(phrases);
        self
    }

    /// Set a log label to debug candidate queries at the top level.
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.phrase.set_log(log)
    }

    /// Parse the given sequence of row strings into a [SyntaxTree].
    ///
    /// Each row keeps its own line terminator if any; line breaks are **not**
    /// interpreted and must be present in the data if they are to be parsed.
    pub fn parse_rows<I>(&self, rows: I) -> Result<SyntaxTree<TTag, TIdx>, ParseError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut arena = TokenArena::new();
        let root = arena.push_root(self.phrase.clone());
        let mut index = TIdx::default();
        let buffer = rows.into_iter().map(Into::into).collect();
        Parser::new(&mut arena, &mut index, buffer, root).run()?;
        Ok(SyntaxTree { arena, root, index })
    }

    /// Parse a string: split into rows keeping the line terminators, then
    /// [parse_rows](Root::parse_rows).
    pub fn parse_string(&self, string: &str) -> Result<SyntaxTree<TTag, TIdx>, ParseError> {
        self.parse_rows(string.split_inclusive('\n'))
    }
}

impl<TTag: TagImpl + 'static, TIdx: ITokenIndex<TTag> + Default> Default for Root<TTag, TIdx> {
    fn default() -> Self {
        Self::new()
    }
}
