use axum::response::Html;

use crate::{
    guard::{LOGIN_PATH, POST_LOGIN_PATH},
    web::templates::render_page,
};

const LOGIN_SCRIPT: &str = r#"<script>
(function() {
    const form = document.getElementById('login-form');
    const status = document.getElementById('login-status');
    form.addEventListener('submit', async function(event) {
        event.preventDefault();
        status.textContent = '';
        const payload = {
            email: form.elements.email.value,
            password: form.elements.password.value,
        };
        try {
            const response = await fetch('/api/auth/login', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify(payload),
            });
            const body = await response.json();
            if (response.ok) {
                window.location.href = '__POST_LOGIN__';
            } else {
                status.textContent = body.message || 'Login failed';
            }
        } catch (err) {
            status.textContent = 'Network error, please try again.';
        }
    });
})();
</script>"#;

const LOGOUT_FORM: &str = r#"<form method="post" action="/api/auth/logout"><button type="submit">Log out</button></form>"#;

pub async fn home() -> Html<String> {
    Html(render_page(
        "Create without limits",
        r#"<div class="panel"><p>Boards, chat and an AI workspace for your creative projects.</p><p><a href="/form">Sign in</a> to get started.</p></div>"#,
    ))
}

pub async fn login_form() -> Html<String> {
    let body = format!(
        r#"<div class="panel">
    <form id="login-form" action="{LOGIN_PATH}">
        <label for="email">Email</label>
        <input id="email" name="email" type="email" autocomplete="username" required>
        <label for="password">Password</label>
        <input id="password" name="password" type="password" autocomplete="current-password" required>
        <button type="submit">Sign in</button>
        <div id="login-status" class="status-box"></div>
    </form>
</div>
{}"#,
        LOGIN_SCRIPT.replace("__POST_LOGIN__", POST_LOGIN_PATH)
    );
    Html(render_page("Sign in", &body))
}

pub async fn boards() -> Html<String> {
    Html(member_page("Boards", "Your boards will appear here."))
}

pub async fn workspace() -> Html<String> {
    Html(member_page("Workspace", "Open a board to start working."))
}

pub async fn chat() -> Html<String> {
    Html(member_page("Chat", "No conversations yet."))
}

pub async fn payment() -> Html<String> {
    Html(member_page("Payment", "Manage your plan and billing."))
}

fn member_page(title: &str, note: &str) -> String {
    let body = format!(r#"<div class="panel"><p>{note}</p>{LOGOUT_FORM}</div>"#);
    render_page(title, &body)
}
