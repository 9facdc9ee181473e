//! Post composer: caption, image attachments and tagged users picked from a
//! directory.

/// Most images a post can carry.
pub const MAX_IMAGES: usize = 5;
/// Largest accepted image, in bytes (10 MiB).
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// A picked image file. Only what the limits need is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub name: String,
    pub size: u64,
}

impl ImageAttachment {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedUser {
    pub id: u64,
    pub name: String,
    pub username: String,
}

impl TaggedUser {
    pub fn new(id: u64, name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            username: username.into(),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.username.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Default)]
pub struct PostDraft {
    caption: String,
    search: String,
    directory: Vec<TaggedUser>,
    tagged: Vec<TaggedUser>,
    images: Vec<ImageAttachment>,
}

impl PostDraft {
    pub fn with_directory(directory: Vec<TaggedUser>) -> Self {
        Self {
            directory,
            ..Self::default()
        }
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn set_caption(&mut self, caption: String) {
        self.caption = caption;
    }

    pub fn images(&self) -> &[ImageAttachment] {
        &self.images
    }

    /// Attaches a batch of picked files and returns one message per rejection.
    ///
    /// A batch that would take the post past [`MAX_IMAGES`] is rejected as a
    /// whole. Otherwise files over [`MAX_IMAGE_BYTES`] are dropped and the
    /// rest are appended in order.
    pub fn add_images(&mut self, files: Vec<ImageAttachment>) -> Vec<String> {
        if self.images.len() + files.len() > MAX_IMAGES {
            return vec![format!("You can only upload up to {MAX_IMAGES} images")];
        }

        let mut rejected = Vec::new();
        for file in files {
            if file.size > MAX_IMAGE_BYTES {
                rejected.push(format!("{} is larger than 10MB", file.name));
            } else {
                self.images.push(file);
            }
        }
        rejected
    }

    /// Removes the image at `index`, if any.
    pub fn remove_image(&mut self, index: usize) -> Option<ImageAttachment> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, query: String) {
        self.search = query;
    }

    /// Directory entries whose name or username contains the query (case-insensitive).
    pub fn filtered(&self) -> Vec<&TaggedUser> {
        let needle = self.search.to_lowercase();
        self.directory
            .iter()
            .filter(|user| user.matches(&needle))
            .collect()
    }

    pub fn tagged(&self) -> &[TaggedUser] {
        &self.tagged
    }

    pub fn is_tagged(&self, id: u64) -> bool {
        self.tagged.iter().any(|user| user.id == id)
    }

    /// Tags the user, or untags it if already tagged. Identity is the id.
    pub fn toggle_tag(&mut self, user: TaggedUser) {
        if self.is_tagged(user.id) {
            self.tagged.retain(|tagged| tagged.id != user.id);
        } else {
            self.tagged.push(user);
        }
    }
}
