//! Curated reading lists grouped by category.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::lookup::{LookupTable, MatchKind, TableFile};

pub const DEFAULT_BOOK_COUNT: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub level: String,
    pub rating: f32,
    pub description: String,
}

impl Book {
    fn matches(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.author.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookShelf {
    pub books: Vec<Book>,
}

/// A search hit, tagged with the category it was found under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizedBook {
    #[serde(flatten)]
    pub book: Book,
    pub category: String,
}

#[derive(Debug, Deserialize)]
struct BookFile {
    #[serde(flatten)]
    table: TableFile<BookShelf>,
    default_key: String,
}

#[derive(Debug, Clone)]
pub struct BookTable {
    table: LookupTable<BookShelf>,
    default: BookShelf,
}

impl BookTable {
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: BookFile = serde_json::from_str(raw)?;
        let table: LookupTable<BookShelf> = file.table.into();
        let default = table.get(&file.default_key).cloned().with_context(|| {
            format!("default book category '{}' is not in the table", file.default_key)
        })?;
        Ok(Self { table, default })
    }

    /// Up to `count` books for `career`, in curated order.
    pub fn books_for(&self, career: &str, count: usize) -> (&[Book], MatchKind) {
        let (shelf, kind) = match self.table.resolve(career) {
            Some(hit) => (hit.value, hit.match_kind),
            None => (&self.default, MatchKind::Default),
        };
        let end = count.min(shelf.books.len());
        (&shelf.books[..end], kind)
    }

    pub fn categories(&self) -> Vec<&str> {
        self.table.keys().collect()
    }

    /// Case-insensitive substring search over title, author and description.
    pub fn search_books(&self, query: &str) -> Vec<CategorizedBook> {
        let needle = query.to_lowercase();
        self.table
            .iter()
            .flat_map(|(category, shelf)| {
                shelf
                    .books
                    .iter()
                    .filter(|book| book.matches(&needle))
                    .map(move |book| CategorizedBook {
                        book: book.clone(),
                        category: category.to_string(),
                    })
            })
            .collect()
    }
}
