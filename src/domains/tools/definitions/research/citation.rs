//! Citation formatting.

use super::arxiv::PaperInfo;

/// Supported citation styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationFormat {
    Bibtex,
    Apa,
    Simple,
}

impl CitationFormat {
    /// Resolve a style name; anything unrecognized is `Simple`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "bibtex" => Self::Bibtex,
            "apa" => Self::Apa,
            _ => Self::Simple,
        }
    }
}

pub fn format_citation(paper_id: &str, info: &PaperInfo, format: CitationFormat) -> String {
    let year = info.year();
    match format {
        CitationFormat::Bibtex => format!(
            "@article{{{id},\n  author = {{{authors}}},\n  title = {{{title}}},\n  \
             journal = {{arXiv preprint arXiv:{id}}},\n  year = {{{year}}},\n  url = {{{url}}}\n}}",
            id = paper_id,
            authors = info.authors.join(" and "),
            title = info.title,
            year = year,
            url = info.pdf_url,
        ),
        CitationFormat::Apa => {
            let authors = match info.authors.as_slice() {
                [] => "Unknown".to_string(),
                [only] => only.clone(),
                [first, second] => format!("{} & {}", first, second),
                [first, ..] => format!("{} et al.", first),
            };
            format!(
                "{} ({}). {}. arXiv preprint arXiv:{}.",
                authors, year, info.title, paper_id
            )
        }
        CitationFormat::Simple => {
            let author = info.authors.first().map(String::as_str).unwrap_or("Unknown");
            format!("{} ({}). {}. arXiv:{}", author, year, info.title, paper_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(authors: &[&str]) -> PaperInfo {
        PaperInfo {
            title: "On Computable Numbers".to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            summary: String::new(),
            pdf_url: "http://arxiv.org/pdf/1936.00001v1".to_string(),
            published: "1936-11-12".to_string(),
            categories: Vec::new(),
        }
    }

    #[test]
    fn test_bibtex() {
        let citation = format_citation(
            "1936.00001v1",
            &info(&["Alan Turing", "Alonzo Church"]),
            CitationFormat::Bibtex,
        );
        assert_eq!(
            citation,
            "@article{1936.00001v1,\n  author = {Alan Turing and Alonzo Church},\n  \
             title = {On Computable Numbers},\n  journal = {arXiv preprint arXiv:1936.00001v1},\n  \
             year = {1936},\n  url = {http://arxiv.org/pdf/1936.00001v1}\n}"
        );
    }

    #[test]
    fn test_apa_author_lists() {
        let one = format_citation("x", &info(&["A"]), CitationFormat::Apa);
        assert_eq!(one, "A (1936). On Computable Numbers. arXiv preprint arXiv:x.");

        let two = format_citation("x", &info(&["A", "B"]), CitationFormat::Apa);
        assert!(two.starts_with("A & B (1936)."));

        let many = format_citation("x", &info(&["A", "B", "C"]), CitationFormat::Apa);
        assert!(many.starts_with("A et al. (1936)."));
    }

    #[test]
    fn test_simple_and_unknown_format() {
        assert_eq!(CitationFormat::from_name("MLA"), CitationFormat::Simple);
        assert_eq!(CitationFormat::from_name("BibTeX"), CitationFormat::Bibtex);

        let citation = format_citation("x", &info(&[]), CitationFormat::Simple);
        assert_eq!(citation, "Unknown (1936). On Computable Numbers. arXiv:x");
    }
}
