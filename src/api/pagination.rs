//! Offset pagination and infinite-scroll accumulation for list routes.

// self
use crate::_prelude::*;

/// Page size used by the list routes unless a caller picks another.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A 1-based page position and its size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageCursor {
	page: u32,
	size: u32,
}
impl PageCursor {
	/// Creates a cursor; zero page numbers and sizes are raised to one.
	pub fn new(page: u32, size: u32) -> Self {
		Self { page: page.max(1), size: size.max(1) }
	}

	/// First page of `size` items.
	pub fn first(size: u32) -> Self {
		Self::new(1, size)
	}

	/// 1-based page number.
	pub fn page(self) -> u32 {
		self.page
	}

	/// Items per page.
	pub fn size(self) -> u32 {
		self.size
	}

	/// Offset of the first item: `(page - 1) * size`.
	pub fn start(self) -> u64 {
		u64::from(self.page - 1) * u64::from(self.size)
	}

	/// The following page.
	pub fn next(self) -> Self {
		Self { page: self.page.saturating_add(1), size: self.size }
	}

	/// Appends `start` and `limit` query parameters to `path`.
	pub fn apply(self, path: &str) -> String {
		format!("{path}?start={}&limit={}", self.start(), self.size)
	}
}
impl Default for PageCursor {
	fn default() -> Self {
		Self::first(DEFAULT_PAGE_SIZE)
	}
}

/// `ceil(total / size)`, the page count implied by a total item count.
pub fn total_pages(total: u64, size: u32) -> u32 {
	let size = u64::from(size.max(1));

	u32::try_from(total.div_ceil(size)).unwrap_or(u32::MAX)
}

/// One fetched page of a list route.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
	/// Items on this page, in backend order.
	pub items: Vec<T>,
	/// Cursor the page was fetched with.
	pub cursor: PageCursor,
	/// Total number of pages reported or implied by the backend.
	pub total_pages: u32,
}
impl<T> Page<T> {
	/// Whether a later page exists.
	pub fn has_more(&self) -> bool {
		self.cursor.page() < self.total_pages
	}

	/// Cursor for the following page, if any.
	pub fn next_cursor(&self) -> Option<PageCursor> {
		self.has_more().then(|| self.cursor.next())
	}
}

/// Items that carry a stable backend identifier.
pub trait Identified {
	/// Identifier used to drop duplicates across pages.
	fn id(&self) -> &str;
}

/// Items accumulated across pages, de-duplicated by id.
///
/// A duplicate keeps the position of its first appearance and takes the newest value, so a
/// row that shifts between pages while the list grows is neither lost nor shown twice.
#[derive(Clone, Debug)]
pub struct Paged<T> {
	items: Vec<T>,
	positions: HashMap<String, usize>,
	next: Option<PageCursor>,
	total_pages: u32,
}
impl<T> Paged<T>
where
	T: Identified,
{
	/// Starts an empty accumulation that will fetch `first` next.
	pub fn new(first: PageCursor) -> Self {
		Self { items: Vec::new(), positions: HashMap::new(), next: Some(first), total_pages: 0 }
	}

	/// Folds a fetched page into the accumulation.
	pub fn extend(&mut self, page: Page<T>) {
		self.total_pages = page.total_pages;
		self.next = page.next_cursor();

		for item in page.items {
			let seen = self.positions.get(item.id()).copied();

			match seen {
				Some(index) => self.items[index] = item,
				None => {
					self.positions.insert(item.id().to_owned(), self.items.len());
					self.items.push(item);
				},
			}
		}
	}

	/// Cursor to fetch next; `None` once the last page has been folded in.
	pub fn next_cursor(&self) -> Option<PageCursor> {
		self.next
	}

	/// Whether more pages remain.
	pub fn has_more(&self) -> bool {
		self.next.is_some()
	}

	/// Total page count last reported by the backend.
	pub fn total_pages(&self) -> u32 {
		self.total_pages
	}

	/// Accumulated items.
	pub fn items(&self) -> &[T] {
		&self.items
	}

	/// Consumes the accumulation.
	pub fn into_items(self) -> Vec<T> {
		self.items
	}
}
impl<T> Default for Paged<T>
where
	T: Identified,
{
	fn default() -> Self {
		Self::new(PageCursor::default())
	}
}
