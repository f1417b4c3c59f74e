//! Fixed user-facing messages.

use crate::config::Language;

/// Answer given when no neighbor passes the confidence gate.
pub fn out_of_scope(language: Language) -> &'static str {
    match language {
        Language::English => "I don't know. Your question is outside the scope of the lesson.",
        Language::Portuguese => "Não sei. Sua pergunta está fora do escopo da aula.",
    }
}

/// Full response to an unsupported query.
pub fn no_supporting_document(language: Language) -> &'static str {
    match language {
        Language::English => {
            "There is no supporting document for this question, as it is outside the scope of the lesson."
        }
        Language::Portuguese => {
            "Não há documento de apoio para esta pergunta, pois ela foge do escopo da aula."
        }
    }
}

pub fn text_file(language: Language) -> &'static str {
    match language {
        Language::English => "The supporting document can be found in the text file.",
        Language::Portuguese => "O documento de apoio pode ser encontrado no arquivo de texto.",
    }
}

pub fn pdf_page(language: Language, page: usize) -> String {
    match language {
        Language::English => format!("The supporting document is on page {} of the PDF", page),
        Language::Portuguese => format!("O documento de apoio encontra-se na página {} do PDF", page),
    }
}

pub fn pdf_page_range(language: Language, first: usize, last: usize) -> String {
    match language {
        Language::English => format!(
            "The supporting document is between pages {} and {} of the PDF",
            first, last
        ),
        Language::Portuguese => format!(
            "O documento de apoio encontra-se entre as páginas {} e {} do PDF",
            first, last
        ),
    }
}

/// `range` is already formatted as `m:s-m:s`.
pub fn video_range(language: Language, range: &str) -> String {
    match language {
        Language::English => format!(
            "The supporting document is in the video between minutes {}",
            range
        ),
        Language::Portuguese => format!(
            "O documento de apoio está no vídeo entre os minutos {}",
            range
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_file_message() {
        assert!(text_file(Language::English).contains("found in the text file"));
        assert!(text_file(Language::Portuguese).contains("arquivo de texto"));
    }

    #[test]
    fn test_formatted_messages() {
        assert!(pdf_page_range(Language::English, 2, 3).contains("between pages 2 and 3"));
        assert!(video_range(Language::Portuguese, "0:5-0:12").ends_with("0:5-0:12"));
    }
}
