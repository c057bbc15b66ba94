use serde::Serialize;

/// One rendering instruction for the presentation layer
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayBlock {
    Image { url: String, width: u32 },
    Heading { text: String },
    Field { label: String, value: String },
    Divider,
    Expander { title: String, blocks: Vec<DisplayBlock> },
    Warning { message: String },
    Error { message: String },
}

impl DisplayBlock {
    pub fn field(label: &str, value: impl ToString) -> Self {
        DisplayBlock::Field {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// A rendered search result page
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Page {
    pub title: String,
    pub blocks: Vec<DisplayBlock>,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: DisplayBlock) {
        self.blocks.push(block);
    }
}
