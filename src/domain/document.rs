/// Rich-text body for ticket descriptions, independent of the tracker's wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(String),
    Heading { level: u8, text: String },
    BulletList(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn paragraph(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(Block::Paragraph(text.into()));
        self
    }

    pub fn heading(mut self, level: u8, text: impl Into<String>) -> Self {
        self.blocks.push(Block::Heading {
            level,
            text: text.into(),
        });
        self
    }

    pub fn bullets<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocks
            .push(Block::BulletList(items.into_iter().map(Into::into).collect()));
        self
    }

    /// The standard layout applied by the auto-fix agent.
    pub fn standard_structure() -> Self {
        Document::default()
            .paragraph("Improved by the war room orchestrator")
            .heading(3, "Acceptance Criteria")
            .bullets(["Unit tests passed", "Code reviewed"])
            .heading(3, "Steps to Reproduce")
            .paragraph("(Auto-generated structure for clarity)")
    }
}
