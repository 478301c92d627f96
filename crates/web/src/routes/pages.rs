use crate::middleware::CurrentUser;
use axum::{response::Html, Extension};
use services::forms::FieldErrors;

/// Minimal HTML escaping for values interpolated into pages
pub fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn page_shell(title: &str, body: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html>
<head>
    <title>{title} - Cinelog</title>
    <style>
        body {{ font-family: sans-serif; max-width: 480px; margin: 40px auto; padding: 0 16px; }}
        .notice {{ color: #b00020; margin: 12px 0; }}
        .field-error {{ color: #b00020; font-size: 0.9em; }}
        label {{ display: block; margin-top: 12px; }}
        input {{ width: 100%; padding: 6px; }}
        button {{ margin-top: 16px; padding: 8px 16px; }}
        .providers a {{ display: inline-block; margin-right: 8px; }}
        nav a {{ margin-right: 12px; }}
    </style>
</head>
<body>
{body}
</body>
</html>"##
    )
}

fn field_error_html(errors: &FieldErrors, field: &str) -> String {
    match errors.get(field) {
        Some(message) => format!(r#"<div class="field-error">{message}</div>"#),
        None => String::new(),
    }
}

/// The login page doubles as the landing page. `notice` carries flow-level
/// failures (rejected credentials, callback errors); `errors` carries
/// per-field validation messages; `email` repopulates the form.
pub fn render_login_page(notice: Option<&str>, errors: &FieldErrors, email: &str) -> Html<String> {
    let notice_html = match notice {
        Some(message) => format!(r#"<div class="notice">{}</div>"#, escape(message)),
        None => String::new(),
    };
    let body = format!(
        r##"<h1>Sign in to Cinelog</h1>
{notice_html}
<form method="post" action="/login">
    <label>Email
        <input type="email" name="email" value="{email}">
    </label>
    {email_error}
    <label>Password
        <input type="password" name="password">
    </label>
    {password_error}
    <button type="submit">Sign in</button>
</form>
<div class="providers">
    <p>Or continue with:</p>
    <a href="/auth/login/google" onclick="startOauth(this)">Google</a>
    <a href="/auth/login/facebook" onclick="startOauth(this)">Facebook</a>
    <a href="/auth/login/apple" onclick="startOauth(this)">Apple</a>
</div>
<p><a href="/signup">Create an account</a></p>
<script>
    // One click only; the server rejects concurrent attempts anyway
    function startOauth(link) {{
        document.querySelectorAll('.providers a').forEach(function (a) {{
            a.style.pointerEvents = 'none';
            a.style.opacity = '0.5';
        }});
    }}
</script>"##,
        email = escape(email),
        email_error = field_error_html(errors, "email"),
        password_error = field_error_html(errors, "password"),
    );
    Html(page_shell("Sign in", &body))
}

pub fn render_signup_page(
    notice: Option<&str>,
    errors: &FieldErrors,
    email: &str,
    username: &str,
) -> Html<String> {
    let notice_html = match notice {
        Some(message) => format!(r#"<div class="notice">{}</div>"#, escape(message)),
        None => String::new(),
    };
    let body = format!(
        r##"<h1>Create your Cinelog account</h1>
{notice_html}
<form method="post" action="/signup">
    <label>Email
        <input type="email" name="email" value="{email}">
    </label>
    {email_error}
    <label>Username
        <input type="text" name="username" value="{username}">
    </label>
    {username_error}
    <label>Password
        <input type="password" name="password">
    </label>
    {password_error}
    <label>Confirm password
        <input type="password" name="confirm">
    </label>
    {confirm_error}
    <label>First name (optional)
        <input type="text" name="first_name">
    </label>
    <label>Last name (optional)
        <input type="text" name="last_name">
    </label>
    <button type="submit">Sign up</button>
</form>
<p><a href="/">Back to sign in</a></p>"##,
        email = escape(email),
        username = escape(username),
        email_error = field_error_html(errors, "email"),
        username_error = field_error_html(errors, "username"),
        password_error = field_error_html(errors, "password"),
        confirm_error = field_error_html(errors, "confirm"),
    );
    Html(page_shell("Sign up", &body))
}

fn profile_nav() -> &'static str {
    r##"<nav>
    <a href="/dashboard">Dashboard</a>
    <a href="/films">Films</a>
    <a href="/watchlist">Watchlist</a>
    <a href="/likes">Likes</a>
    <a href="/diary">Diary</a>
    <a href="/activity">Activity</a>
    <a href="/logout">Sign out</a>
</nav>"##
}

pub async fn login_page() -> Html<String> {
    render_login_page(None, &FieldErrors::new(), "")
}

pub async fn signup_page() -> Html<String> {
    render_signup_page(None, &FieldErrors::new(), "", "")
}

pub async fn dashboard(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    let body = format!(
        r##"{nav}
<h1>Welcome back, {username}</h1>
<p>Signed in as {email}</p>"##,
        nav = profile_nav(),
        username = escape(&user.username),
        email = escape(&user.email),
    );
    Html(page_shell("Dashboard", &body))
}

/// The film-tracking sections themselves are served elsewhere; these pages
/// only prove the session gate and give the navigation a target.
fn profile_section(user: &services::backend::User, section: &str) -> Html<String> {
    let body = format!(
        r##"{nav}
<h1>{section}</h1>
<p>{username}'s {lower} will appear here.</p>"##,
        nav = profile_nav(),
        section = section,
        username = escape(&user.username),
        lower = section.to_lowercase(),
    );
    Html(page_shell(section, &body))
}

pub async fn films(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    profile_section(&user, "Films")
}

pub async fn watchlist(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    profile_section(&user, "Watchlist")
}

pub async fn likes(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    profile_section(&user, "Likes")
}

pub async fn diary(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    profile_section(&user, "Diary")
}

pub async fn activity(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Html<String> {
    profile_section(&user, "Activity")
}
