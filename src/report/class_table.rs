/// HTML rendering of the classification table (`class_table.html` include)
use crate::bio::taxonomy::Rank;
use crate::bio::trees::TreeDataset;
use crate::core::classification::ClassificationTable;
use crate::core::higher_taxa::HigherTaxaCache;
use crate::Result;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

/// Turns a taxon name into the HTML shown in its table cell
pub trait DisplayLabel {
    fn label(&self, name: &str) -> String;
}

/// Scientific name only, in italics
pub struct ScientificLabeler;

impl DisplayLabel for ScientificLabeler {
    fn label(&self, name: &str) -> String {
        format!("<i>{}</i>", html_escape(name))
    }
}

/// "Common name (<i>Scientific name</i>)" when a common name is known.
///
/// Higher taxa come from the GBIF cache; species fall back to the tree
/// dataset's own common names.
pub struct CommonNameLabeler<'a> {
    higher_taxa: &'a HigherTaxaCache,
    trees: Option<&'a TreeDataset>,
}

impl<'a> CommonNameLabeler<'a> {
    pub fn new(higher_taxa: &'a HigherTaxaCache) -> Self {
        Self {
            higher_taxa,
            trees: None,
        }
    }

    pub fn with_trees(mut self, trees: &'a TreeDataset) -> Self {
        self.trees = Some(trees);
        self
    }
}

impl DisplayLabel for CommonNameLabeler<'_> {
    fn label(&self, name: &str) -> String {
        let scientific = ScientificLabeler.label(name);
        let common = self
            .higher_taxa
            .common_name(name)
            .or_else(|| self.trees.and_then(|t| t.common_name(name)));
        match common {
            Some(common) => format!("{} ({})", html_escape(common), scientific),
            None => scientific,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassTableOptions {
    pub rotated_ranks: Vec<Rank>,
}

impl Default for ClassTableOptions {
    fn default() -> Self {
        Self {
            rotated_ranks: vec![Rank::Kingdom, Rank::Phylum, Rank::Class],
        }
    }
}

/// Render the table; cells continuing a rowspan from above emit nothing
pub fn render_class_table(
    table: &ClassificationTable,
    labeler: &dyn DisplayLabel,
    options: &ClassTableOptions,
) -> String {
    let mut html = String::with_capacity(256 + table.row_count() * 128);

    html.push_str("<div class=\"classification\">\n<table>\n");
    html.push_str("<tr>\n");
    for rank in table.ranks() {
        let _ = writeln!(html, "<th><div class=\"rotated\">{}</div></th>", rank);
    }
    html.push_str("</tr>\n");

    for row in 0..table.row_count() {
        html.push_str("<tr>\n");
        for (rank, cell) in table.row(row) {
            let label = labeler.label(&cell.name);
            if options.rotated_ranks.contains(&rank) {
                let _ = writeln!(
                    html,
                    "<td rowspan=\"{}\"><div class=\"rotated\">{}</div></td>",
                    cell.rowspan, label
                );
            } else {
                let _ = writeln!(html, "<td rowspan=\"{}\">{}</td>", cell.rowspan, label);
            }
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</table>\n</div>\n");
    html
}

pub fn write_class_table<P: AsRef<Path>>(
    path: P,
    table: &ClassificationTable,
    labeler: &dyn DisplayLabel,
    options: &ClassTableOptions,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    info!("Writing {}...", path.display());
    fs::write(path, render_class_table(table, labeler, options))?;
    Ok(())
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
