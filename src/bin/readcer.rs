use std::{env, fs, process};
use bytes::Bytes;
use rescert::{Cert, CertKind, Options, RouterKeyIndex};


fn usage() -> ! {
    eprintln!("Usage: readcer [--strict] [--ta <tal-key>] <path>...");
    process::exit(2)
}

fn main() {
    let mut options = Options::default();
    let mut tal_key = None;
    let mut paths = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--strict" => options = options.strict(true),
            "--ta" => {
                let path = match args.next() {
                    Some(path) => path,
                    None => usage()
                };
                match fs::read(&path) {
                    Ok(data) => tal_key = Some(data),
                    Err(err) => {
                        eprintln!("{}: Can’t read file: {}", path, err);
                        process::exit(1)
                    }
                }
            }
            _ => paths.push(arg),
        }
    }
    if paths.is_empty() {
        usage()
    }

    // A bad certificate doesn’t stop the batch.
    let mut failed = false;
    let mut router_keys = RouterKeyIndex::with_options(&options);
    for path in &paths {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(err) => {
                eprintln!("{}: Can’t read file: {}", path, err);
                failed = true;
                continue
            }
        };
        let cert = Cert::decode(Bytes::from(data), &options).and_then(|cert| {
            match tal_key.as_ref() {
                Some(key) => cert.validate_ta(key),
                None => cert.validate_issued(),
            }
        });
        match cert {
            Ok(cert) => {
                print_cert(path, &cert);
                router_keys.insert_cert(&cert);
            }
            Err(err) => {
                eprintln!("{}: {}", path, err);
                failed = true;
            }
        }
    }

    for (key, info) in router_keys.iter() {
        println!(
            "router key {} {} expires {}",
            key.asn(), key.key_identifier(), info.expires()
        );
    }

    if failed {
        process::exit(1)
    }
}

fn print_cert(path: &str, cert: &Cert) {
    println!("{}:", path);
    println!("  purpose: {}", cert.purpose());
    println!("  subject key identifier: {}", cert.subject_key_identifier());
    if let Some(aki) = cert.authority_key_identifier() {
        println!("  authority key identifier: {}", aki);
    }
    if let Some(uri) = cert.ca_issuer() {
        println!("  issuer: {}", uri);
    }
    if let Some(uri) = cert.crl_uri() {
        println!("  CRL: {}", uri);
    }
    println!("  expires: {}", cert.expires());
    match cert.kind() {
        CertKind::Ca(repository) => {
            println!("  repository: {}", repository.ca_repository());
            println!("  manifest: {}", repository.rpki_manifest());
            if let Some(uri) = repository.rpki_notify() {
                println!("  notify: {}", uri);
            }
        }
        CertKind::BgpsecRouter(key) => {
            println!("  router key: {}", key);
        }
    }
    if !cert.ip_resources().is_empty() {
        println!("  IP resources: {}", cert.ip_resources());
    }
    if !cert.as_resources().is_empty() {
        println!("  AS resources: {}", cert.as_resources());
    }
}
