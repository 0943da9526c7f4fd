//! # Page Break Decisions
//!
//! The rules for when a block of content starts a new page. Blocks are
//! judged on an *estimated* height before they are drawn; the renderer then
//! advances by the measured height, so a poor estimate only moves a break,
//! it never misplaces content.

/// What to do with the next block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// Place the block on the current page.
    Place,
    /// Finish this page and place the block at the top of a new one.
    MoveToNextPage,
}

/// What the renderer knows about a subcategory block before drawing it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockFit {
    /// Estimated height of the block, including its category header when
    /// it opens a category.
    pub estimated_height: f64,
    /// Space left between the cursor and the bottom of the usable band.
    pub remaining_height: f64,
    /// The block is the first subcategory of its category.
    pub opens_category: bool,
    /// Nothing has been placed on the current page yet.
    pub page_is_fresh: bool,
}

/// Decide whether a subcategory block starts a new page.
///
/// A fresh page always takes the block: moving it would only produce an
/// empty page. Otherwise the block moves when its estimate overflows, or
/// when it opens a category and less than `min_category_space` remains,
/// so a category header never sits alone at the foot of a page.
pub fn decide_block(fit: &BlockFit, min_category_space: f64) -> BreakDecision {
    if fit.page_is_fresh {
        return BreakDecision::Place;
    }
    if fit.estimated_height > fit.remaining_height {
        return BreakDecision::MoveToNextPage;
    }
    if fit.opens_category && fit.remaining_height < min_category_space {
        return BreakDecision::MoveToNextPage;
    }
    BreakDecision::Place
}

/// Decide whether a block that needs `required` points (totals, terms)
/// starts a new page.
pub fn decide_reserved(remaining_height: f64, required: f64, page_is_fresh: bool) -> BreakDecision {
    if page_is_fresh || remaining_height >= required {
        BreakDecision::Place
    } else {
        BreakDecision::MoveToNextPage
    }
}
