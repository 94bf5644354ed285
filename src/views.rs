//! Server-rendered pages. Every dynamic value goes through [`escape`].

use chrono::{NaiveDate, NaiveTime};

use crate::model::{attendance_type::AttendanceType, employee::Employee};

const FINGERPRINT_JS: &str = "https://openfpcdn.io/fingerprintjs/v4/iife.min.js";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Warning,
    Error,
}

impl FlashLevel {
    fn css_class(self) -> &'static str {
        match self {
            FlashLevel::Success => "flash-success",
            FlashLevel::Warning => "flash-warning",
            FlashLevel::Error => "flash-error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
:root {{ --bg:#f5f7fb; --fg:#1f2933; --card:#fff; --accent:#4f81bd; }}
.theme-dark {{ --bg:#111827; --fg:#e5e7eb; --card:#1f2937; }}
body {{ font-family: system-ui, sans-serif; background: var(--bg); color: var(--fg); margin: 0; }}
main {{ max-width: 32rem; margin: 2rem auto; background: var(--card); padding: 1.5rem; border-radius: .75rem; }}
label {{ display: block; margin-top: 1rem; font-weight: 600; }}
select, input, textarea, button {{ width: 100%; padding: .6rem; margin-top: .25rem; box-sizing: border-box; }}
button {{ background: var(--accent); color: #fff; border: 0; border-radius: .5rem; margin-top: 1.25rem; cursor: pointer; }}
.flash {{ padding: .75rem; border-radius: .5rem; margin-bottom: 1rem; }}
.flash-success {{ background: #d1fae5; color: #065f46; }}
.flash-warning {{ background: #fef3c7; color: #92400e; }}
.flash-error {{ background: #fee2e2; color: #991b1b; }}
.hidden {{ display: none; }}
.theme-toggle {{ width: auto; float: right; margin: 0; background: transparent; color: var(--fg); }}
</style>
<script>
(function () {{
  var saved = localStorage.getItem('ui:theme');
  var dark = saved ? saved === 'dark' : window.matchMedia('(prefers-color-scheme: dark)').matches;
  document.documentElement.classList.toggle('theme-dark', dark);
  document.addEventListener('DOMContentLoaded', function () {{
    document.querySelectorAll('[data-action="theme-toggle"]').forEach(function (btn) {{
      btn.addEventListener('click', function () {{
        var next = !document.documentElement.classList.contains('theme-dark');
        document.documentElement.classList.toggle('theme-dark', next);
        localStorage.setItem('ui:theme', next ? 'dark' : 'light');
      }});
    }});
  }});
}})();
</script>
</head>
<body>
<main>
<button type="button" class="theme-toggle" data-action="theme-toggle" aria-label="Cambiar tema">◐</button>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        body = body,
    )
}

fn flash_html(flash: Option<&Flash>) -> String {
    match flash {
        Some(f) => format!(
            r#"<div class="flash {}" role="alert">{}</div>"#,
            f.level.css_class(),
            escape(&f.message)
        ),
        None => String::new(),
    }
}

fn employee_options(employees: &[Employee]) -> String {
    employees
        .iter()
        .map(|e| format!(r#"<option value="{}">{}</option>"#, e.id, escape(&e.full_name())))
        .collect()
}

fn type_options(types: &[AttendanceType]) -> String {
    types
        .iter()
        .map(|t| format!(r#"<option value="{}">{}</option>"#, t.id, escape(&t.label)))
        .collect()
}

fn fingerprint_script() -> String {
    format!(
        r#"<script src="{FINGERPRINT_JS}"></script>
<script>
window.deviceFingerprint = (window.FingerprintJS
  ? FingerprintJS.load().then(function (fp) {{ return fp.get(); }}).then(function (r) {{ return r.visitorId; }})
  : Promise.resolve(''));
window.deviceFingerprint.then(function (id) {{
  document.querySelectorAll('input[name="fingerprint"]').forEach(function (el) {{ el.value = id; }});
}});
</script>"#
    )
}

/// The attendance form served at `/`.
pub fn attendance_form(
    employees: &[Employee],
    types: &[AttendanceType],
    flash: Option<&Flash>,
) -> String {
    let body = format!(
        r#"<h1>Registro de asistencia</h1>
{flash}
<form method="post" action="/">
  <label for="empleado">Empleado</label>
  <select id="empleado" name="empleado" required>
    <option value="">Seleccione…</option>
    {employees}
  </select>
  <label for="tipo_evento">Tipo de evento</label>
  <select id="tipo_evento" name="tipo_evento" required>
    <option value="">Seleccione…</option>
    {types}
  </select>
  <label for="descripcion">Descripción (opcional)</label>
  <input id="descripcion" name="descripcion" maxlength="50">
  <input type="hidden" name="fingerprint" value="">
  <button type="submit">Registrar</button>
</form>
{script}"#,
        flash = flash_html(flash),
        employees = employee_options(employees),
        types = type_options(types),
        script = fingerprint_script(),
    );
    layout("Registro de asistencia", &body)
}

/// Confirmation page after a successful punch.
pub fn check_in_success(
    employee: &Employee,
    date: NaiveDate,
    time: NaiveTime,
    flash: &Flash,
    back_to: &str,
) -> String {
    let body = format!(
        r#"<h1>Asistencia registrada</h1>
{flash}
<p><strong>{name}</strong></p>
<p>Fecha: {date}</p>
<p>Hora: {time}</p>
<p><a href="{back}">Registrar otro evento</a></p>"#,
        flash = flash_html(Some(flash)),
        name = escape(&employee.full_name()),
        date = date.format("%d/%m/%Y"),
        time = time.format("%H:%M:%S"),
        back = escape(back_to),
    );
    layout("Asistencia registrada", &body)
}

/// The kiosk page opened by scanning the QR code. The device fingerprint is
/// resolved client-side against the identify API to preselect the employee.
pub fn kiosk_page(
    employees: &[Employee],
    types: &[AttendanceType],
    api_prefix: &str,
    flash: Option<&Flash>,
) -> String {
    let body = format!(
        r#"<h1>Marcación por QR</h1>
{flash}
<p id="greeting" class="hidden"></p>
<form method="post" action="/qr/checkin" id="kiosk-form">
  <div id="employee-picker">
    <label for="empleado">Empleado</label>
    <select id="empleado" name="empleado">
      <option value="">Seleccione…</option>
      {employees}
    </select>
    <button type="button" id="bind-device">Recordar este dispositivo</button>
  </div>
  <label for="tipo_evento">Tipo de evento</label>
  <select id="tipo_evento" name="tipo_evento" required>
    <option value="">Seleccione…</option>
    {types}
  </select>
  <label for="descripcion">Descripción (opcional)</label>
  <input id="descripcion" name="descripcion" maxlength="50">
  <input type="hidden" name="fingerprint" value="">
  <button type="submit">Registrar</button>
</form>
{script}
<script>
(function () {{
  var api = '{api}';
  function post(path, payload) {{
    return fetch(api + path, {{
      method: 'POST',
      headers: {{ 'Content-Type': 'application/json' }},
      body: JSON.stringify(payload)
    }}).then(function (r) {{ return r.json(); }});
  }}
  function greet(employee) {{
    var g = document.getElementById('greeting');
    g.textContent = 'Hola, ' + employee.name;
    g.classList.remove('hidden');
    document.getElementById('employee-picker').classList.add('hidden');
    document.getElementById('empleado').value = String(employee.id);
  }}
  window.deviceFingerprint.then(function (fp) {{
    if (!fp) return;
    post('/fingerprint/identify', {{ fingerprint: fp }}).then(function (res) {{
      if (res.known && res.employee) greet(res.employee);
    }});
    document.getElementById('bind-device').addEventListener('click', function () {{
      var id = parseInt(document.getElementById('empleado').value, 10);
      if (!id) return;
      post('/fingerprint/bind', {{ fingerprint: fp, employee_id: id }}).then(function (res) {{
        if (res.employee) greet(res.employee);
      }});
    }});
  }});
}})();
</script>"#,
        flash = flash_html(flash),
        employees = employee_options(employees),
        types = type_options(types),
        script = fingerprint_script(),
        api = escape(api_prefix.trim_end_matches('/')),
    );
    layout("Marcación por QR", &body)
}

/// Staff landing page with both downloads.
pub fn download_page(username: &str) -> String {
    let body = format!(
        r#"<h1>Descargas</h1>
<p>Sesión iniciada como <strong>{user}</strong>.</p>
<p><a href="/login/descargar/asistencia">Descargar registro de asistencia (.xlsx)</a></p>
<p><a href="/login/descargar/resumen">Descargar resumen diario (.xlsx)</a></p>
<p><a href="/login/qr">Código QR de marcación</a></p>
<form method="post" action="/accounts/logout"><button type="submit">Cerrar sesión</button></form>"#,
        user = escape(username),
    );
    layout("Descargas", &body)
}

/// Shown when a check-in page cannot be built.
pub fn error_page(message: &str, back_to: &str) -> String {
    let flash = Flash::new(FlashLevel::Error, message);
    let body = format!(
        r#"<h1>Registro de asistencia</h1>
{flash}
<p><a href="{back}">Volver</a></p>"#,
        flash = flash_html(Some(&flash)),
        back = escape(back_to),
    );
    layout("Error", &body)
}

pub fn login_page(error: Option<&str>, next: &str) -> String {
    let flash = error.map(|e| Flash::new(FlashLevel::Error, e));
    let body = format!(
        r#"<h1>Acceso del personal</h1>
{flash}
<form method="post" action="/accounts/login">
  <label for="username">Usuario</label>
  <input id="username" name="username" autocomplete="username" required>
  <label for="password">Contraseña</label>
  <input id="password" name="password" type="password" autocomplete="current-password" required>
  <input type="hidden" name="next" value="{next}">
  <button type="submit">Ingresar</button>
</form>"#,
        flash = flash_html(flash.as_ref()),
        next = escape(next),
    );
    layout("Acceso del personal", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::employee;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<b>"Peñaherrera" & 'Orrillo'</b>"#),
            "&lt;b&gt;&quot;Peñaherrera&quot; &amp; &#x27;Orrillo&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn form_lists_employees_and_types() {
        let employees = vec![employee(1, "Julio Daniel", "Peñaherrera Orrillo")];
        let types = vec![AttendanceType {
            id: 3,
            label: "Inicio Almuerzo".into(),
        }];
        let html = attendance_form(&employees, &types, None);
        assert!(html.contains(r#"<option value="1">Julio Daniel Peñaherrera Orrillo</option>"#));
        assert!(html.contains(r#"<option value="3">Inicio Almuerzo</option>"#));
        assert!(html.contains(r#"name="fingerprint""#));
        assert!(!html.contains(r#"role="alert""#));
    }

    #[test]
    fn flash_is_rendered_escaped() {
        let flash = Flash::new(FlashLevel::Warning, "Ya registraste \"Entrada\" hoy.");
        let html = attendance_form(&[], &[], Some(&flash));
        assert!(html.contains(r#"<div class="flash flash-warning" role="alert">"#));
        assert!(html.contains("Ya registraste &quot;Entrada&quot; hoy."));
    }

    #[test]
    fn employee_names_cannot_inject_markup() {
        let employees = vec![employee(1, "<script>", "x")];
        let html = attendance_form(&employees, &[], None);
        assert!(html.contains("&lt;script&gt; x"));
    }

    #[test]
    fn kiosk_page_points_at_the_api() {
        let html = kiosk_page(&[], &[], "/api/", None);
        assert!(html.contains("var api = '/api';"));
        assert!(html.contains("/fingerprint/identify"));
        assert!(html.contains("/fingerprint/bind"));
    }

    #[test]
    fn login_page_keeps_next() {
        let html = login_page(Some("Credenciales inválidas"), "/login/descarga");
        assert!(html.contains(r#"value="/login/descarga""#));
        assert!(html.contains("Credenciales inválidas"));
    }

    #[test]
    fn error_page_links_back() {
        let html = error_page("Error inesperado. Intente nuevamente.", "/qr/checkin");
        assert!(html.contains(r#"<div class="flash flash-error" role="alert">"#));
        assert!(html.contains("Error inesperado. Intente nuevamente."));
        assert!(html.contains(r#"href="/qr/checkin""#));
    }
}
