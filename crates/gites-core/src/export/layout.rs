//! Greedy pagination of stacked captures.
//!
//! Each capture is stretched to the full sheet width and stacked top to
//! bottom. A new sheet starts when the next capture plus the gap allowance
//! would run past the bottom edge; the first capture never triggers a break.

/// Sheet size in layout units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

/// Where one capture lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Position of the capture in the input order
    pub index: usize,
    /// Zero-based sheet number
    pub page: usize,
    /// Offset from the top of the sheet
    pub y: f32,
    /// Always the sheet width
    pub width: f32,
    /// Height after proportional scaling
    pub height: f32,
}

impl Placement {
    /// True if the capture runs past the bottom of its sheet.
    pub fn overflows(&self, page: PageSize) -> bool {
        self.y + self.height > page.height
    }
}

/// The full layout of one export.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub page: PageSize,
    pub placements: Vec<Placement>,
    /// Number of sheets; an empty layout still has its first sheet
    pub page_count: usize,
}

impl PageLayout {
    /// Lay out captures given their pixel `(width, height)` in display order.
    ///
    /// Widths must be non-zero.
    pub fn build(sizes: &[(u32, u32)], page: PageSize, gap: f32) -> Self {
        let mut placements = Vec::with_capacity(sizes.len());
        let mut page_index = 0;
        let mut current_height = 0.0_f32;

        for (index, &(width, height)) in sizes.iter().enumerate() {
            let scaled_height = page.width * (height as f32 / width as f32);

            if index > 0 && current_height + scaled_height + gap > page.height {
                page_index += 1;
                current_height = 0.0;
            }

            let placement = Placement {
                index,
                page: page_index,
                y: current_height,
                width: page.width,
                height: scaled_height,
            };
            if placement.overflows(page) {
                tracing::warn!(
                    "Capture {} is taller than a page ({:.1} > {:.1}), placing it alone on page {}",
                    index,
                    scaled_height,
                    page.height,
                    page_index
                );
            }
            placements.push(placement);

            current_height += scaled_height;
        }

        Self {
            page,
            placements,
            page_count: page_index + 1,
        }
    }

    /// Placements on a given sheet, in order.
    pub fn on_page(&self, page: usize) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(move |p| p.page == page)
    }
}
