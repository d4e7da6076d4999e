pub(super) const BACKEND_HELP: &str = "
The Mailgun secrets backend dynamically generates Mailgun SMTP credentials
for a single sending domain. Every credential is issued with a lease and is
deleted from Mailgun when the lease is revoked or expires.

Configure the API key and domain through the \"config\" endpoint before
reading from \"credentials\".
";

pub(super) const CONFIG_SYNOPSIS: &str = "Configure the Mailgun backend.";

pub(super) const CONFIG_DESCRIPTION: &str = "\
The Mailgun backend requires an API key and the domain to generate SMTP \
credentials for. Both are checked against Mailgun before they are stored. \
The optional ttl and max_ttl fields set the default lease lifetime and the \
renewal ceiling for issued credentials; omitted fields keep their previous \
values. The API key is never returned by a read.";

pub(super) const CREDENTIALS_SYNOPSIS: &str = "Generate a Mailgun SMTP credential.";

pub(super) const CREDENTIALS_DESCRIPTION: &str = "\
Each read creates a new SMTP login of the form vault.<suffix> with a random \
password on the configured domain and returns it with a renewable lease.";
