//! Static HTML served by the presentation handlers.

/// Multipart field carrying the uploaded document.
pub const FILE_FIELD: &str = "docx";

/// Upload form served at `/`.
pub const UPLOAD_FORM: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>DOCX to PDF Converter</title>
    <style>
        body { font-family: Arial, sans-serif; max-width: 600px; margin: 50px auto; padding: 20px; }
        .upload-area { border: 2px dashed #ccc; padding: 40px; text-align: center; margin: 20px 0; }
        button { background: #007cba; color: white; padding: 10px 20px; border: none; cursor: pointer; }
        button:hover { background: #005a87; }
    </style>
</head>
<body>
    <h1>DOCX to PDF Converter</h1>
    <form action="/convert" method="post" enctype="multipart/form-data">
        <div class="upload-area">
            <input type="file" name="docx" accept=".docx" required>
            <p>Select a DOCX file to convert to PDF</p>
        </div>
        <button type="submit">Convert to PDF</button>
    </form>
</body>
</html>
"#;

/// Success page linking to the converted artifact.
pub fn success_page(artifact_name: &str) -> String {
    let href = format!("/download/{}", urlencoding::encode(artifact_name));
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Conversion Complete</title>
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 600px; margin: 50px auto; padding: 20px; }}
        .success {{ background: #d4edda; border: 1px solid #c3e6cb; padding: 15px; border-radius: 5px; }}
        a {{ color: #007cba; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
    </style>
</head>
<body>
    <h1>Conversion Complete!</h1>
    <div class="success">
        <p>Your DOCX file has been successfully converted to PDF.</p>
        <p><a href="{href}" download>Download PDF</a></p>
        <p><code>{name}</code></p>
    </div>
    <p><a href="/">Convert another file</a></p>
</body>
</html>
"#,
        href = escape_html(&href),
        name = escape_html(artifact_name),
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
