use super::{Article, Category};
use regex::Regex;
use std::sync::LazyLock;

/// Keyword to tag table, checked in order against the lowercased question.
pub const TAG_KEYWORDS: &[(&str, &str)] = &[
    ("thêm", "thêm mới"),
    ("xóa", "xóa"),
    ("sửa", "chỉnh sửa"),
    ("tìm", "tìm kiếm"),
    ("export", "xuất file"),
    ("sinh viên", "sinh viên"),
    ("giáo viên", "giáo viên"),
    ("lớp", "lớp học"),
    ("điểm", "điểm số"),
    ("môn học", "môn học"),
    ("khoa", "khoa"),
    ("đăng nhập", "đăng nhập"),
    ("mật khẩu", "mật khẩu"),
];

/// Tag applied when no keyword matches.
pub const DEFAULT_TAG: &str = "hướng dẫn";

static SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^## ").expect("section pattern"));
static QUESTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*Q: (.+?)\?\*\*").expect("question pattern"));
static ANSWER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*A:").expect("answer pattern"));
static TRAILING_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\n[ \t]*-{3,}[ \t]*)+$").expect("rule pattern"));

pub(super) fn parse_categories(markdown: &str) -> Vec<Category> {
    // The first piece is the preamble before any `## ` heading.
    SECTION
        .split(markdown)
        .skip(1)
        .filter_map(parse_section)
        .collect()
}

fn parse_section(section: &str) -> Option<Category> {
    let (heading, body) = section.split_once('\n').unwrap_or((section, ""));
    let name = strip_pictographs(heading).trim().to_string();
    let articles = parse_articles(body);
    if articles.is_empty() {
        return None;
    }
    Some(Category {
        description: format!("Câu hỏi về {name}"),
        name,
        articles,
    })
}

fn parse_articles(body: &str) -> Vec<Article> {
    let questions: Vec<_> = QUESTION.captures_iter(body).collect();
    let mut articles = Vec::with_capacity(questions.len());

    for (position, captures) in questions.iter().enumerate() {
        let (Some(whole), Some(text)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        let block_end = questions
            .get(position + 1)
            .and_then(|next| next.get(0))
            .map_or(body.len(), |next| next.start());
        let block = &body[whole.end()..block_end];

        let Some(marker) = ANSWER_MARKER.find(block) else {
            continue;
        };
        let answer = TRAILING_RULE.replace(block[marker.end()..].trim_end(), "");
        let answer = answer.trim();
        if answer.is_empty() {
            continue;
        }

        let question = text.as_str().trim();
        articles.push(Article {
            title: format!("{question}?"),
            content: answer.to_string(),
            tags: tags_for(question),
        });
    }
    articles
}

/// Tags for a question, falling back to [`DEFAULT_TAG`].
pub fn tags_for(question: &str) -> Vec<String> {
    let lowered = question.to_lowercase();
    let tags: Vec<String> = TAG_KEYWORDS
        .iter()
        .filter(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, tag)| tag.to_string())
        .collect();
    if tags.is_empty() {
        vec![DEFAULT_TAG.to_string()]
    } else {
        tags
    }
}

/// Remove emoji and pictographic symbols (plus their joiners and variation selectors).
pub fn strip_pictographs(text: &str) -> String {
    text.chars().filter(|ch| !is_pictograph(*ch)).collect()
}

fn is_pictograph(ch: char) -> bool {
    matches!(
        ch as u32,
        0x1F000..=0x1FAFF | 0x2600..=0x27BF | 0x2B00..=0x2BFF | 0xFE00..=0xFE0F | 0x200D
    )
}
