//! Share page served at `/loc/{token}`.
//!
//! The template is bundled as a `&'static str`. The script in it is the
//! browser side of the best-fix protocol, the same one `acquirer` implements.

use acquirer::FixConfig;

use crate::utils::format_number;

const TEMPLATE: &str = r##"<!doctype html>
<html>
<head>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width, initial-scale=1"/>
  <title>Compartilhar localização</title>
</head>
<body style="font-family:Arial; padding:16px; max-width:640px; margin:auto;">
  <h2>Compartilhar localização</h2>
  <p>Toque no botão para enviar sua localização. (O navegador pode pedir permissão.)</p>

  <button id="btn" style="padding:12px 16px; font-size:16px;">Enviar minha localização</button>
  <pre id="out" style="margin-top:16px; white-space:pre-wrap;"></pre>

<script>
  const TOKEN = __TOKEN__;
  const FIX = { maxWaitMs: __MAX_WAIT_MS__, minAcc: __MIN_ACCURACY_M__, checkMs: __CHECK_INTERVAL_MS__ };

  const out = document.getElementById("out");
  const btn = document.getElementById("btn");

  function bestFix({ maxWaitMs, minAcc, checkMs }) {
    return new Promise((resolve, reject) => {
      if (!navigator.geolocation) return reject(new Error("Geolocalização não suportada."));

      const start = Date.now();
      let best = null;
      let watchId = null;
      let timer = null;

      // Releases both the subscription and the ticker, whoever finishes first.
      const finish = (settle, value) => {
        if (watchId !== null) navigator.geolocation.clearWatch(watchId);
        if (timer !== null) clearInterval(timer);
        watchId = null;
        timer = null;
        settle(value);
      };

      watchId = navigator.geolocation.watchPosition(
        (pos) => {
          if (!best || pos.coords.accuracy < best.coords.accuracy) best = pos;
          out.textContent = `Buscando GPS... melhor precisão: ${Math.round(best.coords.accuracy)} m`;

          if (pos.coords.accuracy <= minAcc) finish(resolve, pos);
        },
        (err) => (best ? finish(resolve, best) : finish(reject, err)),
        { enableHighAccuracy: true, maximumAge: 0, timeout: 10000 }
      );

      timer = setInterval(() => {
        if (Date.now() - start < maxWaitMs) return;

        if (best) finish(resolve, best);
        else finish(reject, new Error("Sem fix GPS a tempo."));
      }, checkMs);
    });
  }

  btn.onclick = async () => {
    if (btn.disabled) return;
    btn.disabled = true;
    out.textContent = "Iniciando GPS (pode levar alguns segundos)...";

    let pos;
    try {
      pos = await bestFix(FIX);
    } catch (e) {
      btn.disabled = false;
      out.textContent = "Não foi possível obter boa precisão. Erro: " + (e.message || e);
      return;
    }

    out.textContent = "Enviando...";
    const payload = {
      token: TOKEN,
      lat: pos.coords.latitude,
      lon: pos.coords.longitude,
      acc: pos.coords.accuracy,
      ts: Date.now()
    };

    try {
      const r = await fetch("/api/location", {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify(payload)
      });

      if (r.ok) {
        out.textContent = `Enviado ✅ (precisão ~${Math.round(pos.coords.accuracy)} m)`;
      } else {
        btn.disabled = false;
        out.textContent = "Falha ao enviar ❌ (" + r.status + ")";
      }
    } catch (e) {
      btn.disabled = false;
      out.textContent = "Falha ao enviar ❌ (" + (e.message || e) + ")";
    }
  };
</script>

</body>
</html>"##;

pub fn render(token: &str, fix: &FixConfig) -> String {
    // Token goes in last so its contents are never rescanned.
    TEMPLATE
        .replace("__MAX_WAIT_MS__", &fix.max_wait.as_millis().to_string())
        .replace("__MIN_ACCURACY_M__", &format_number(fix.min_accuracy_meters))
        .replace(
            "__CHECK_INTERVAL_MS__",
            &fix.check_interval.as_millis().to_string(),
        )
        .replace("__TOKEN__", &script_string(token))
}

/// JSON string literal that cannot close the surrounding `<script>`.
fn script_string(value: &str) -> String {
    serde_json::Value::from(value)
        .to_string()
        .replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_interpolates_token_and_fix() {
        let fix = FixConfig {
            max_wait: Duration::from_millis(15_000),
            min_accuracy_meters: 25.0,
            check_interval: Duration::from_millis(250),
        };

        let html = render("ABC123", &fix);

        assert!(html.contains(r#"const TOKEN = "ABC123";"#));
        assert!(html.contains("maxWaitMs: 15000, minAcc: 25, checkMs: 250"));
        assert!(!html.contains("__"));
    }

    #[test]
    fn test_defaults_match_acquirer() {
        let html = render("ABC123", &FixConfig::default());

        assert!(html.contains("maxWaitMs: 20000, minAcc: 30, checkMs: 250"));
        assert!(html.contains("enableHighAccuracy: true, maximumAge: 0"));
    }

    #[test]
    fn test_token_cannot_break_out() {
        let html = render(r#"a"</script><script>alert(1)"#, &FixConfig::default());

        assert!(html.contains(r#"const TOKEN = "a\"<\/script><script>alert(1)";"#));
        assert_eq!(html.matches("</script>").count(), 1);
    }
}
