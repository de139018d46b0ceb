use serde::Deserialize;

use super::types::PreviewRequest;

/// Which bootstrap script a new instance boots with.
///
/// `Application` clones the repository and deploys whatever kind of app it
/// detects; `Static` only publishes the repository's preview page (or the
/// generated fallback) behind nginx.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployFlavor {
    Application,
    Static,
}

const NGINX_STATIC_SITE: &str = r#"server {
    listen 80 default_server;
    listen [::]:80 default_server;
    root /var/www/html;
    index index.html;
    server_name _;
    location / {
        try_files $uri $uri/ =404;
    }
}"#;

const NGINX_SPA_SITE: &str = r#"server {
    listen 80 default_server;
    server_name _;
    root /var/www/html;
    index index.html;
    location / {
        try_files $uri $uri/ /index.html;
    }
}"#;

const NGINX_NODE_PROXY: &str = r#"server {
    listen 80 default_server;
    server_name _;
    location / {
        proxy_pass http://localhost:3000;
        proxy_http_version 1.1;
        proxy_set_header Upgrade $http_upgrade;
        proxy_set_header Connection 'upgrade';
        proxy_set_header Host $host;
        proxy_cache_bypass $http_upgrade;
    }
}"#;

const NGINX_PYTHON_PROXY: &str = r#"server {
    listen 80 default_server;
    server_name _;
    location / {
        proxy_pass http://localhost:5000;
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
    }
}"#;

const PYTHON_APP_UNIT: &str = r#"[Unit]
Description=Preview application
After=network.target

[Service]
Type=simple
User=ubuntu
WorkingDirectory=/home/ubuntu/app
ExecStart=/usr/bin/python3 app.py
Restart=always

[Install]
WantedBy=multi-user.target"#;

/// Generate the bootstrap script an instance runs at first boot.
///
/// The script runs as root, logs to /var/log/user-data.log, and is
/// idempotent enough to rerun on a redeploy: the repository is cloned once
/// and fetched afterwards, and every config file write is a full overwrite.
pub fn user_data(request: &PreviewRequest, flavor: DeployFlavor) -> String {
    let header = format!(
        r#"#!/bin/bash
set -e
exec > >(tee /var/log/user-data.log) 2>&1

echo "Setting up preview environment for PR #{pr}"
export DEBIAN_FRONTEND=noninteractive
apt-get update -qq
"#,
        pr = request.pr_number,
    );

    let checkout = format!(
        r#"cd /home/ubuntu
if [ ! -d app ]; then
    git clone https://github.com/{repo}.git app
fi
cd app
git fetch origin {branch}
git checkout {commit}
"#,
        repo = request.repo_name,
        branch = request.branch,
        commit = request.commit_sha,
    );

    let body = match flavor {
        DeployFlavor::Application => application_body(request, &checkout),
        DeployFlavor::Static => static_body(request, &checkout),
    };

    format!(
        r#"{header}
{body}
systemctl restart nginx
echo "Deployment complete"
"#
    )
}

/// Full deployment: detect the app kind by marker file and wire nginx
/// accordingly, falling back to a static page when no marker matches.
fn application_body(request: &PreviewRequest, checkout: &str) -> String {
    let page = fallback_page(request);
    format!(
        r#"apt-get install -y nginx git curl

{checkout}
if [ -f package.json ]; then
    echo "Node app detected"
    curl -fsSL https://deb.nodesource.com/setup_18.x | bash -
    apt-get install -y nodejs
    npm install
    if grep -q '"react"' package.json; then
        echo "React app detected, serving static build"
        npm run build
        rm -rf /var/www/html/*
        cp -r build/* /var/www/html/
        cat > /etc/nginx/sites-available/default << 'NGINX_EOF'
{NGINX_SPA_SITE}
NGINX_EOF
    else
        echo "Node service detected, running under pm2"
        npm install -g pm2
        pm2 start npm --name app -- start
        pm2 save
        pm2 startup systemd
        cat > /etc/nginx/sites-available/default << 'NGINX_EOF'
{NGINX_NODE_PROXY}
NGINX_EOF
    fi
elif [ -f requirements.txt ]; then
    echo "Python app detected, running under systemd"
    apt-get install -y python3-pip
    pip3 install -r requirements.txt
    cat > /etc/systemd/system/app.service << 'SERVICE_EOF'
{PYTHON_APP_UNIT}
SERVICE_EOF
    systemctl daemon-reload
    systemctl enable app
    systemctl restart app
    cat > /etc/nginx/sites-available/default << 'NGINX_EOF'
{NGINX_PYTHON_PROXY}
NGINX_EOF
else
    echo "No app markers found, publishing fallback page"
    rm -rf /var/www/html/*
    cat > /var/www/html/index.html << 'PAGE_EOF'
{page}
PAGE_EOF
    cat > /etc/nginx/sites-available/default << 'NGINX_EOF'
{NGINX_STATIC_SITE}
NGINX_EOF
fi
"#
    )
}

/// Static-only deployment: publish the repository's preview page if it has
/// one, else the generated fallback.
fn static_body(request: &PreviewRequest, checkout: &str) -> String {
    let page = fallback_page(request);
    format!(
        r#"apt-get install -y nginx git

{checkout}
rm -rf /var/www/html/*
if [ -f public/preview.html ]; then
    cp public/preview.html /var/www/html/index.html
else
    cat > /var/www/html/index.html << 'PAGE_EOF'
{page}
PAGE_EOF
fi
cat > /etc/nginx/sites-available/default << 'NGINX_EOF'
{NGINX_STATIC_SITE}
NGINX_EOF
"#
    )
}

fn fallback_page(request: &PreviewRequest) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>PR #{pr} preview</title></head>
<body>
<h1>Preview environment for PR #{pr}</h1>
<p>{repo} &mdash; branch {branch} at {commit}</p>
</body>
</html>"#,
        pr = request.pr_number,
        repo = request.repo_name,
        branch = request.branch,
        commit = request.short_sha(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> PreviewRequest {
        PreviewRequest {
            pr_number: 7,
            repo_name: "acme/widgets".to_string(),
            branch: "feature-x".to_string(),
            commit_sha: "abcdef1234567890".to_string(),
        }
    }

    #[test]
    fn test_application_script_clones_and_checks_out_commit() {
        let script = user_data(&sample_request(), DeployFlavor::Application);
        assert!(script.contains("git clone https://github.com/acme/widgets.git app"));
        assert!(script.contains("git fetch origin feature-x"));
        assert!(script.contains("git checkout abcdef1234567890"));
    }

    #[test]
    fn test_application_script_detects_app_kinds() {
        let script = user_data(&sample_request(), DeployFlavor::Application);
        assert!(script.contains("if [ -f package.json ]; then"));
        assert!(script.contains("elif [ -f requirements.txt ]; then"));
        assert!(script.contains("grep -q '\"react\"' package.json"));
        assert!(script.contains("pm2 start npm --name app -- start"));
        assert!(script.contains("systemctl enable app"));
    }

    #[test]
    fn test_application_script_has_static_fallback() {
        let script = user_data(&sample_request(), DeployFlavor::Application);
        assert!(script.contains("Preview environment for PR #7"));
        assert!(script.contains("try_files $uri $uri/ =404;"));
    }

    #[test]
    fn test_static_script_skips_app_deployment() {
        let script = user_data(&sample_request(), DeployFlavor::Static);
        assert!(!script.contains("pm2"));
        assert!(!script.contains("package.json"));
        assert!(script.contains("cp public/preview.html /var/www/html/index.html"));
        assert!(script.contains("git checkout abcdef1234567890"));
    }

    #[test]
    fn test_script_logs_and_fails_fast() {
        for flavor in [DeployFlavor::Application, DeployFlavor::Static] {
            let script = user_data(&sample_request(), flavor);
            assert!(script.starts_with("#!/bin/bash\nset -e\n"));
            assert!(script.contains("tee /var/log/user-data.log"));
            assert!(script.contains("systemctl restart nginx"));
        }
    }

    #[test]
    fn test_fallback_page_carries_request_details() {
        let page = fallback_page(&sample_request());
        assert!(page.contains("PR #7"));
        assert!(page.contains("acme/widgets"));
        assert!(page.contains("feature-x"));
        assert!(page.contains("abcdef1"));
    }
}
