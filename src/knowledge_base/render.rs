use super::{KnowledgeBase, KnowledgeBaseError};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use html_escape::encode_text;

const CSV_HEADER: &str = "Category,Question,Answer,Tags\n";

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html lang="vi">
<head>
    <meta charset="UTF-8">
    <title>Tawk.to Knowledge Base Import</title>
    <style>
        body { font-family: Arial, sans-serif; padding: 20px; max-width: 1200px; margin: 0 auto; }
        .category { margin-bottom: 40px; border: 2px solid #ddd; padding: 20px; border-radius: 8px; }
        .category-title { font-size: 24px; color: #2563eb; margin-bottom: 10px; }
        .article { margin-bottom: 20px; background: #f9fafb; padding: 15px; border-radius: 5px; }
        .article-title { font-size: 18px; font-weight: bold; color: #1f2937; margin-bottom: 8px; }
        .article-content { color: #4b5563; line-height: 1.6; white-space: pre-wrap; }
        .tag { display: inline-block; background: #dbeafe; color: #1e40af; padding: 4px 8px;
               border-radius: 4px; font-size: 12px; margin-right: 5px; }
        .instructions { background: #fef3c7; padding: 20px; border-radius: 8px; margin-bottom: 30px; }
    </style>
</head>
<body>
    <div class="instructions">
        <h2>Hướng dẫn import vào Tawk.to</h2>
        <ol>
            <li>Đăng nhập <a href="https://dashboard.tawk.to/" target="_blank">Tawk.to Dashboard</a></li>
            <li>Vào <strong>Knowledge Base</strong> → <strong>Categories</strong></li>
            <li>Với mỗi category bên dưới: tạo category, thêm từng câu hỏi làm article, dán câu trả lời và tags</li>
            <li>Nhấn <strong>Publish</strong></li>
            <li>Vào <strong>Chatbot</strong> và bật <strong>Knowledge Base Search</strong></li>
        </ol>
    </div>
"#;

const HTML_TAIL: &str = "</body>\n</html>\n";

pub(super) fn render_html(kb: &KnowledgeBase) -> String {
    let mut html = String::from(HTML_HEAD);
    for category in &kb.categories {
        html.push_str("    <div class=\"category\">\n");
        html.push_str(&format!(
            "        <div class=\"category-title\">{}</div>\n",
            encode_text(&category.name)
        ));
        for article in &category.articles {
            html.push_str(&format!(
                "        <div class=\"article\">\n            <div class=\"article-title\">{}</div>\n            <div class=\"article-content\">{}</div>\n            <div class=\"tags\">\n",
                encode_text(&article.title),
                encode_text(&article.content)
            ));
            for tag in &article.tags {
                html.push_str(&format!(
                    "                <span class=\"tag\">{}</span>\n",
                    encode_text(tag)
                ));
            }
            html.push_str("            </div>\n        </div>\n");
        }
        html.push_str("    </div>\n");
    }
    html.push_str(HTML_TAIL);
    html
}

pub(super) fn render_csv(kb: &KnowledgeBase) -> Result<Vec<u8>, KnowledgeBaseError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(CSV_HEADER.as_bytes().to_vec());
    for category in &kb.categories {
        for article in &category.articles {
            let tags = article.tags.join("|");
            writer.write_record([
                category.name.as_str(),
                article.title.as_str(),
                article.content.as_str(),
                tags.as_str(),
            ])?;
        }
    }
    writer
        .into_inner()
        .map_err(|err| KnowledgeBaseError::Csv(err.into_error().into()))
}
