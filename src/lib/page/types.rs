/// Character grid a page has to fit in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportBudget {
    width_chars: usize,
    height_chars: usize,
}

impl ViewportBudget {
    /// `None` when either dimension is zero.
    pub fn new(width_chars: usize, height_chars: usize) -> Option<Self> {
        (width_chars > 0 && height_chars > 0).then_some(Self {
            width_chars,
            height_chars,
        })
    }

    pub fn width_chars(&self) -> usize {
        self.width_chars
    }

    pub fn height_chars(&self) -> usize {
        self.height_chars
    }
}

/// One screenful. Pages split from the same section keep the section title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub body: String,
    /// Zero-based position among the pages of the same section.
    pub part: usize,
    pub parts: usize,
}

impl Page {
    pub fn new(title: &str, body: String, part: usize, parts: usize) -> Self {
        Self {
            title: title.to_string(),
            body,
            part,
            parts,
        }
    }

    pub fn is_continuation(&self) -> bool {
        self.part > 0
    }

    pub fn heading(&self) -> String {
        if self.is_continuation() {
            format!("{} (cont.)", self.title)
        } else {
            self.title.clone()
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.body.lines()
    }

    pub fn fits(&self, viewport: &ViewportBudget) -> bool {
        self.lines().count() <= viewport.height_chars()
            && self
                .lines()
                .all(|line| line.chars().count() <= viewport.width_chars())
    }
}
