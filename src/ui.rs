const SNAPSHOT_PATH: &str = "/api/dashboard";
const LIVE_PATH: &str = "/api/live";
const TRACK_PATH: &str = "/api/track";

/// Script-relative origin, used when no public URL is configured.
const SCRIPT_ORIGIN: &str = "new URL(document.currentScript.src).origin";

pub fn render_dashboard() -> String {
    DASHBOARD_HTML
        .replace("{{SNAPSHOT_PATH}}", SNAPSHOT_PATH)
        .replace("{{LIVE_PATH}}", LIVE_PATH)
}

/// Emitter script the tracked site includes with a `<script src>` tag.
pub fn render_emitter(server_url: Option<&str>) -> String {
    let server_url = match server_url {
        Some(url) => serde_json::Value::String(url.to_string()).to_string(),
        None => SCRIPT_ORIGIN.to_string(),
    };
    EMITTER_JS
        .replace("{{SERVER_URL}}", &server_url)
        .replace("{{TRACK_PATH}}", TRACK_PATH)
}

const EMITTER_JS: &str = r#"(function () {
  'use strict';

  const SERVER_URL = {{SERVER_URL}};
  const PACKAGE_MARKERS = { seducao: 'pcytvby_607625', premium: 'c2a2g68_607613' };
  const CHECKOUT_HOST = 'pay.cakto.com.br';

  const session = {
    id: 'session_' + Date.now() + '_' + Math.random().toString(36).slice(2, 11),
    startTime: Date.now(),
    pageViews: 0,
    buttonClicks: 0,
    packageClicks: { seducao: 0, premium: 0 }
  };

  const send = (eventType, data) => {
    const body = JSON.stringify({
      eventType,
      sessionId: session.id,
      timestamp: Date.now(),
      url: window.location.href,
      referrer: document.referrer,
      data
    });
    fetch(SERVER_URL + '{{TRACK_PATH}}', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body,
      keepalive: true
    }).catch(() => {});
  };

  const packageFor = (button) => {
    const target = (button.href || '') + ' ' + (button.getAttribute('onclick') || '');
    for (const [name, marker] of Object.entries(PACKAGE_MARKERS)) {
      if (target.includes(marker)) return name;
    }
    return 'unknown';
  };

  const isCheckoutButton = (button) => {
    const text = button.textContent || '';
    const target = (button.href || '') + ' ' + (button.getAttribute('onclick') || '');
    return text.includes('LIBERAR PACOTE') || target.includes(CHECKOUT_HOST);
  };

  const trackButtons = () => {
    document.querySelectorAll('button, a').forEach((button) => {
      if (!isCheckoutButton(button)) return;
      button.addEventListener('click', () => {
        const packageType = packageFor(button);
        session.buttonClicks++;
        if (packageType in session.packageClicks) session.packageClicks[packageType]++;
        send('button_click', {
          packageType,
          buttonClicks: session.buttonClicks,
          packageClicks: session.packageClicks,
          buttonText: button.textContent.trim(),
          buttonHref: button.href || null
        });
      });
    });
  };

  const trackScroll = () => {
    let maxScroll = 0;
    let scrollEvents = 0;
    window.addEventListener('scroll', () => {
      const height = document.body.scrollHeight - window.innerHeight;
      if (height <= 0) return;
      const percent = Math.round((window.scrollY / height) * 100);
      if (percent <= maxScroll) return;
      maxScroll = percent;
      scrollEvents++;
      if (percent % 25 === 0) send('scroll_engagement', { scrollPercent: percent, scrollEvents });
    });
  };

  const start = () => {
    session.pageViews++;
    send('page_view', { pageViews: session.pageViews, timeOnPage: Date.now() - session.startTime });
    setTimeout(trackButtons, 1000);
    trackScroll();
    setInterval(() => {
      send('time_on_page', { timeOnPage: Date.now() - session.startTime, pageViews: session.pageViews });
    }, 30000);
    window.addEventListener('pagehide', () => {
      send('page_exit', { timeOnPage: Date.now() - session.startTime });
    });
  };

  if (document.readyState === 'loading') {
    document.addEventListener('DOMContentLoaded', start);
  } else {
    start();
  }
})();
"#;

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Monitoramento em tempo real</title>
  <style>
    :root {
      --bg-1: #14161c;
      --bg-2: #2a1f33;
      --ink: #f3efe8;
      --muted: #a9a3b5;
      --accent: #ff6b4a;
      --accent-2: #4ac2ff;
      --card: rgba(255, 255, 255, 0.06);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%), var(--bg-1);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(980px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: baseline;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.6rem, 3vw, 2.2rem);
    }

    .status {
      font-size: 0.9rem;
      color: var(--muted);
    }

    .status.live {
      color: #6be38b;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
      gap: 14px;
    }

    .card {
      background: var(--card);
      border-radius: 18px;
      padding: 18px;
    }

    .card .label {
      color: var(--muted);
      font-size: 0.85rem;
    }

    .card .value {
      font-size: 1.9rem;
      font-weight: 600;
      margin-top: 6px;
    }

    .hours {
      display: grid;
      grid-template-columns: repeat(24, 1fr);
      align-items: end;
      gap: 4px;
      height: 140px;
    }

    .hours div {
      background: var(--accent-2);
      border-radius: 4px 4px 0 0;
      min-height: 2px;
    }

    ul.feed {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 8px;
    }

    ul.feed li {
      display: flex;
      justify-content: space-between;
      gap: 12px;
      font-size: 0.95rem;
    }

    ul.feed li.click {
      color: var(--accent);
    }

    ul.feed time {
      color: var(--muted);
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Monitoramento</h1>
      <span id="status" class="status">conectando...</span>
    </header>

    <section class="panel">
      <div class="card"><div class="label">Visitas totais</div><div class="value" id="totalVisits">0</div></div>
      <div class="card"><div class="label">Visitas hoje</div><div class="value" id="visitsToday">0</div></div>
      <div class="card"><div class="label">Cliques</div><div class="value" id="totalClicks">0</div></div>
      <div class="card"><div class="label">Sedução</div><div class="value" id="seducaoClicks">0</div></div>
      <div class="card"><div class="label">Premium</div><div class="value" id="premiumClicks">0</div></div>
      <div class="card"><div class="label">Sessões ativas</div><div class="value" id="activeSessions">0</div></div>
      <div class="card"><div class="label">Conversão</div><div class="value"><span id="conversionRate">0</span>%</div></div>
    </section>

    <section class="card">
      <div class="label">Visitas por hora</div>
      <div class="hours" id="hours"></div>
    </section>

    <section class="card">
      <div class="label">Atividade recente</div>
      <ul class="feed" id="feed"></ul>
    </section>
  </main>

  <script>
    const state = { activity: [] };
    const setText = (id, value) => {
      const el = document.getElementById(id);
      if (el && value !== undefined) el.textContent = value;
    };

    const renderHours = (hours) => {
      const max = Math.max(1, ...hours);
      const root = document.getElementById('hours');
      root.innerHTML = '';
      hours.forEach((count, hour) => {
        const bar = document.createElement('div');
        bar.style.height = `${(count / max) * 100}%`;
        bar.title = `${hour}h: ${count}`;
        root.appendChild(bar);
      });
    };

    const renderFeed = () => {
      const root = document.getElementById('feed');
      root.innerHTML = '';
      state.activity.slice(0, 20).forEach((entry) => {
        const li = document.createElement('li');
        li.className = entry.type;
        const text = document.createElement('span');
        text.textContent = entry.message;
        const time = document.createElement('time');
        time.textContent = new Date(entry.timestamp).toLocaleTimeString('pt-BR');
        li.append(text, time);
        root.appendChild(li);
      });
    };

    const applyCounters = (data) => {
      ['totalVisits', 'visitsToday', 'totalClicks', 'seducaoClicks', 'premiumClicks',
        'activeSessions', 'conversionRate'].forEach((key) => setText(key, data[key]));
      if (Array.isArray(data.visitsByHour)) renderHours(data.visitsByHour);
      if (Array.isArray(data.realtimeActivity)) {
        state.activity = data.realtimeActivity;
        renderFeed();
      }
    };

    const poll = async () => {
      const res = await fetch('{{SNAPSHOT_PATH}}');
      if (res.ok) applyCounters(await res.json());
    };

    const connect = () => {
      const scheme = location.protocol === 'https:' ? 'wss' : 'ws';
      const socket = new WebSocket(`${scheme}://${location.host}{{LIVE_PATH}}`);
      const status = document.getElementById('status');

      socket.onopen = () => {
        status.textContent = 'ao vivo';
        status.className = 'status live';
      };

      socket.onmessage = (msg) => {
        const { event, data } = JSON.parse(msg.data);
        if (event === 'initial_data') {
          applyCounters(data);
        } else if (event === 'visit') {
          applyCounters(data);
          state.activity.unshift({ type: 'visit', message: 'Nova visita detectada', timestamp: Date.now() });
          renderFeed();
        } else if (event === 'button_click') {
          applyCounters(data);
          state.activity.unshift({ type: 'click', message: `Clique (${data.package})`, timestamp: Date.now() });
          renderFeed();
        }
      };

      socket.onclose = () => {
        status.textContent = 'reconectando...';
        status.className = 'status';
        setTimeout(connect, 3000);
      };
    };

    poll().catch(() => {});
    setInterval(() => poll().catch(() => {}), 30000);
    connect();
  </script>
</body>
</html>
"#;
