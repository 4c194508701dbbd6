use std::collections::BTreeSet;

use kulturifiko_schema::{CultureElement, LearningStyle, PostView};

/// Checkbox selections over the two tag dimensions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub culture_elements: BTreeSet<CultureElement>,
    pub learning_styles: BTreeSet<LearningStyle>,
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.culture_elements.is_empty() && self.learning_styles.is_empty()
    }

    /// Flip one culture checkbox
    pub fn toggle_culture_element(&mut self, tag: CultureElement) {
        if !self.culture_elements.remove(&tag) {
            self.culture_elements.insert(tag);
        }
    }

    pub fn toggle_learning_style(&mut self, style: LearningStyle) {
        if !self.learning_styles.remove(&style) {
            self.learning_styles.insert(style);
        }
    }

    /// Any selected tag within a dimension; every dimension with a selection
    pub fn matches(&self, post: &PostView) -> bool {
        let culture_ok = self.culture_elements.is_empty()
            || post.has_any_culture_element(&self.culture_elements);
        let learning_ok = self.learning_styles.is_empty()
            || post.has_any_learning_style(&self.learning_styles);

        culture_ok && learning_ok
    }
}

pub fn filter_posts<'a>(posts: &'a [PostView], filters: &FilterSet) -> Vec<&'a PostView> {
    posts.iter().filter(|post| filters.matches(post)).collect()
}
