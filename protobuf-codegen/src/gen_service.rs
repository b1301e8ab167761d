//! Generates the `ServiceDescriptor`, `Client`, handler trait and `Server`
//! dispatch loop for one `service` block.
//!
//! Every RPC shape funnels through `protobuf_rpc`'s frame codec and stream
//! types; this module only wires together which frames a given method's
//! `client_streaming`/`server_streaming` combination needs and what Rust
//! shape its `Client` method and `Handler` trait method take.

use protobuf_parser::{ResolvedMethod, ResolvedService};

use crate::case_convert::{method_snake_case, snake_case};
use crate::code_writer::CodeWriter;
use crate::customize::Customize;
use crate::rust_type::rust_item_name;

fn method_descriptor_literal(svc_full_name: &str, m: &ResolvedMethod) -> String {
    format!(
        "protobuf_rpc::MethodDescriptor {{ name: {:?}.to_string(), full_path: {:?}.to_string(), input_type: {:?}.to_string(), output_type: {:?}.to_string(), client_streaming: {}, server_streaming: {} }}",
        m.name,
        full_path(svc_full_name, &m.name),
        m.input_type,
        m.output_type,
        m.client_streaming,
        m.server_streaming,
    )
}

/// `"/" + service.name + "/" + method.name"`.
fn full_path(svc_full_name: &str, method_name: &str) -> String {
    format!("/{}/{}", svc_full_name, method_name)
}

/// Rust source text constructing this service's descriptor as a value.
pub fn service_descriptor_literal(svc: &ResolvedService) -> String {
    let mut methods = String::new();
    for m in &svc.methods {
        methods.push_str(&method_descriptor_literal(&svc.full_name, m));
        methods.push_str(", ");
    }
    format!(
        "protobuf_rpc::ServiceDescriptor {{ name: {:?}.to_string(), methods: vec![{}] }}",
        svc.full_name, methods
    )
}

pub fn generate_service(w: &mut CodeWriter, svc: &ResolvedService, package: Option<&str>, customize: &Customize) {
    let fn_name = format!("{}_descriptor", snake_case(&svc.name));
    w.doc_comment(&format!("Runtime descriptor for the `{}` service.", svc.name));
    w.pub_fn(&format!("{}() -> protobuf_rpc::ServiceDescriptor", fn_name), |w| {
        w.write_line(&service_descriptor_literal(svc));
    });
    w.write_line("");

    generate_client(w, svc, package, customize);
    generate_handler_trait(w, svc, package);
    generate_server(w, svc, package, customize);
}

fn generate_client(w: &mut CodeWriter, svc: &ResolvedService, package: Option<&str>, customize: &Customize) {
    let name = &svc.name;
    if customize.derive_debug {
        w.write_line("#[derive(Debug)]");
    }
    w.block(&format!("pub struct {}Client<T: protobuf_rpc::Transport>", name), |w| {
        w.write_line("transport: T,");
    });
    w.write_line("");
    w.block(&format!("impl<T: protobuf_rpc::Transport> {}Client<T>", name), |w| {
        w.pub_fn("new(transport: T) -> Self", |w| {
            w.write_line(&format!("{}Client {{ transport }}", name));
        });
        for m in &svc.methods {
            w.write_line("");
            generate_client_method(w, svc, m, package);
        }
    });
    w.write_line("");
}

fn generate_client_method(w: &mut CodeWriter, svc: &ResolvedService, m: &ResolvedMethod, package: Option<&str>) {
    let method = method_snake_case(&m.name);
    let input = rust_item_name(&m.input_type, package);
    let output = rust_item_name(&m.output_type, package);
    let path = full_path(&svc.full_name, &m.name);

    match (m.client_streaming, m.server_streaming) {
        (false, false) => {
            w.pub_fn(&format!("{}(&mut self, req: &{}) -> protobuf_rpc::RpcResult<{}>", method, input, output), |w| {
                w.write_line(&format!(
                    "self.transport.write_frame(&protobuf_rpc::Frame::Call {{ method: {:?}.to_string(), request: req.encode_to_vec() }})?;",
                    path
                ));
                w.block("match self.transport.read_frame()?", |w| {
                    w.write_line(&format!("protobuf_rpc::Frame::Response(bytes) => Ok({}::decode(&bytes)?),", output));
                    w.write_line("protobuf_rpc::Frame::Error { kind, message } => Err(protobuf_rpc::RpcError::Status { kind, message }),");
                    w.write_line("_ => Err(protobuf_rpc::RpcError::UnexpectedFrameType),");
                });
            });
        }
        (false, true) => {
            w.pub_fn(
                &format!(
                    "{}(&mut self, req: &{}) -> protobuf_rpc::RpcResult<protobuf_rpc::RecvStream<'_, T, {}>>",
                    method, input, output
                ),
                |w| {
                    w.write_line(&format!(
                        "self.transport.write_frame(&protobuf_rpc::Frame::Call {{ method: {:?}.to_string(), request: req.encode_to_vec() }})?;",
                        path
                    ));
                    w.write_line("Ok(protobuf_rpc::RecvStream::new(&mut self.transport))");
                },
            );
        }
        (true, false) => {
            w.pub_fn(
                &format!(
                    "{}(&mut self) -> protobuf_rpc::RpcResult<protobuf_rpc::ClientStreamingCall<'_, T, {}, {}>>",
                    method, input, output
                ),
                |w| {
                    w.write_line(&format!(
                        "self.transport.write_frame(&protobuf_rpc::Frame::Call {{ method: {:?}.to_string(), request: Vec::new() }})?;",
                        path
                    ));
                    w.write_line("Ok(protobuf_rpc::ClientStreamingCall::new(&mut self.transport))");
                },
            );
        }
        (true, true) => {
            w.pub_fn(
                &format!(
                    "{}(&mut self) -> protobuf_rpc::RpcResult<protobuf_rpc::BidiCall<'_, T, {}, {}>>",
                    method, input, output
                ),
                |w| {
                    w.write_line(&format!(
                        "self.transport.write_frame(&protobuf_rpc::Frame::Call {{ method: {:?}.to_string(), request: Vec::new() }})?;",
                        path
                    ));
                    w.write_line("Ok(protobuf_rpc::BidiCall::new(&mut self.transport))");
                },
            );
        }
    }
}

fn generate_handler_trait(w: &mut CodeWriter, svc: &ResolvedService, package: Option<&str>) {
    let name = &svc.name;
    w.doc_comment(&format!("Server-side implementation a `{}Server` dispatches decoded requests to.", name));
    w.block(&format!("pub trait {}Handler", name), |w| {
        for m in &svc.methods {
            let method = method_snake_case(&m.name);
            let input = rust_item_name(&m.input_type, package);
            let output = rust_item_name(&m.output_type, package);
            let sig = match (m.client_streaming, m.server_streaming) {
                (false, false) => format!("fn {}(&mut self, req: {}) -> protobuf_rpc::RpcResult<{}>;", method, input, output),
                (false, true) => format!(
                    "fn {}<T: protobuf_rpc::Transport>(&mut self, req: {}, out: &mut protobuf_rpc::SendStream<T, {}>) -> protobuf_rpc::RpcResult<()>;",
                    method, input, output
                ),
                (true, false) => format!(
                    "fn {}<T: protobuf_rpc::Transport>(&mut self, reqs: &mut protobuf_rpc::RecvStream<T, {}>) -> protobuf_rpc::RpcResult<{}>;",
                    method, input, output
                ),
                (true, true) => format!(
                    "fn {}<T: protobuf_rpc::Transport>(&mut self, call: &mut protobuf_rpc::BidiCall<T, {}, {}>) -> protobuf_rpc::RpcResult<()>;",
                    method, output, input
                ),
            };
            w.write_line(&sig);
        }
    });
    w.write_line("");
}

fn generate_server(w: &mut CodeWriter, svc: &ResolvedService, package: Option<&str>, customize: &Customize) {
    let name = &svc.name;
    if customize.derive_debug {
        w.write_line("#[derive(Debug)]");
    }
    w.block(&format!("pub struct {}Server<H: {}Handler>", name, name), |w| {
        w.write_line("pub handler: H,");
    });
    w.write_line("");
    w.block(&format!("impl<H: {}Handler> {}Server<H>", name, name), |w| {
        w.pub_fn("new(handler: H) -> Self", |w| {
            w.write_line(&format!("{}Server {{ handler }}", name));
        });
        w.write_line("");
        w.doc_comment("Reads and dispatches one CALL at a time until SHUTDOWN or the transport closes.");
        w.pub_fn("serve<T: protobuf_rpc::Transport>(&mut self, transport: &mut T) -> protobuf_rpc::RpcResult<()>", |w| {
            w.block("loop", |w| {
                w.block("match transport.read_frame()?", |w| {
                    w.write_line("protobuf_rpc::Frame::Shutdown => return Ok(()),");
                    w.block("protobuf_rpc::Frame::Call { method, request } =>", |w| {
                        w.block("match method.as_str()", |w| {
                            for m in &svc.methods {
                                let path = full_path(&svc.full_name, &m.name);
                                w.write_line(&format!("{:?} => {{", path));
                                w.indented(|w| generate_dispatch_arm(w, m, package));
                                w.write_line("}");
                            }
                            w.block("other =>", |w| {
                                w.write_line("transport.write_frame(&protobuf_rpc::Frame::Error { kind: \"unknown_method\".to_string(), message: other.to_string() })?;");
                            });
                        });
                    });
                    w.write_line("_ => return Err(protobuf_rpc::RpcError::UnexpectedFrameType),");
                });
            });
        });
    });
    w.write_line("");
}

fn generate_dispatch_arm(w: &mut CodeWriter, m: &ResolvedMethod, package: Option<&str>) {
    let method = method_snake_case(&m.name);
    let input = rust_item_name(&m.input_type, package);

    match (m.client_streaming, m.server_streaming) {
        (false, false) => {
            w.block(&format!("match {}::decode(&request)", input), |w| {
                w.block("Ok(req) =>", |w| {
                    w.block(&format!("match self.handler.{}(req)", method), |w| {
                        w.write_line("Ok(resp) => { transport.write_frame(&protobuf_rpc::Frame::Response(resp.encode_to_vec()))?; }");
                        w.write_line("Err(e) => { transport.write_frame(&protobuf_rpc::Frame::Error { kind: e.kind().to_string(), message: e.to_string() })?; }");
                    });
                });
                w.write_line("Err(e) => { transport.write_frame(&protobuf_rpc::Frame::Error { kind: \"malformed_frame\".to_string(), message: e.to_string() })?; }");
            });
        }
        (false, true) => {
            w.block(&format!("match {}::decode(&request)", input), |w| {
                w.block("Ok(req) =>", |w| {
                    w.write_line("let mut out = protobuf_rpc::SendStream::new(transport);");
                    w.block(&format!("match self.handler.{}(req, &mut out)", method), |w| {
                        w.write_line("Ok(()) => { transport.write_frame(&protobuf_rpc::Frame::StreamEnd)?; }");
                        w.write_line("Err(e) => { transport.write_frame(&protobuf_rpc::Frame::Error { kind: e.kind().to_string(), message: e.to_string() })?; }");
                    });
                });
                w.write_line("Err(e) => { transport.write_frame(&protobuf_rpc::Frame::Error { kind: \"malformed_frame\".to_string(), message: e.to_string() })?; }");
            });
        }
        (true, false) => {
            w.write_line("let _ = request;");
            w.write_line("let mut reqs = protobuf_rpc::RecvStream::new(transport);");
            w.block(&format!("match self.handler.{}(&mut reqs)", method), |w| {
                w.write_line("Ok(resp) => { transport.write_frame(&protobuf_rpc::Frame::Response(resp.encode_to_vec()))?; }");
                w.write_line("Err(e) => { transport.write_frame(&protobuf_rpc::Frame::Error { kind: e.kind().to_string(), message: e.to_string() })?; }");
            });
        }
        (true, true) => {
            w.write_line("let _ = request;");
            w.write_line("let mut call = protobuf_rpc::BidiCall::new(transport);");
            w.block(&format!("match self.handler.{}(&mut call)", method), |w| {
                w.write_line("Ok(()) => { call.close_send()?; }");
                w.write_line("Err(e) => { transport.write_frame(&protobuf_rpc::Frame::Error { kind: e.kind().to_string(), message: e.to_string() })?; }");
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protobuf_parser::ResolvedMethod;

    fn unary_service() -> ResolvedService {
        ResolvedService {
            name: "UnaryService".to_string(),
            full_name: "UnaryService".to_string(),
            methods: vec![
                ResolvedMethod {
                    name: "Ping".to_string(),
                    input_type: ".demo.Req".to_string(),
                    output_type: ".demo.Resp".to_string(),
                    client_streaming: false,
                    server_streaming: false,
                },
            ],
        }
    }

    fn packaged_streaming_service() -> ResolvedService {
        ResolvedService {
            name: "StreamingService".to_string(),
            full_name: "myapp.v1.StreamingService".to_string(),
            methods: vec![ResolvedMethod {
                name: "ServerSide".to_string(),
                input_type: ".demo.Req".to_string(),
                output_type: ".demo.Resp".to_string(),
                client_streaming: false,
                server_streaming: true,
            }],
        }
    }

    #[test]
    fn descriptor_literal_computes_full_path_without_leading_dot_prefix() {
        let svc = unary_service();
        let lit = service_descriptor_literal(&svc);
        assert!(lit.contains("\"/UnaryService/Ping\""));
        assert!(lit.contains("client_streaming: false"));
    }

    #[test]
    fn packaged_service_full_path_keeps_package_prefix() {
        let svc = packaged_streaming_service();
        let lit = service_descriptor_literal(&svc);
        assert!(lit.contains("\"/myapp.v1.StreamingService/ServerSide\""));
        assert!(lit.contains("server_streaming: true"));
    }

    #[test]
    fn unary_client_method_uses_method_snake_case_name() {
        let svc = unary_service();
        let mut w = CodeWriter::new();
        generate_service(&mut w, &svc, Some("demo"), &Customize::default());
        let src = w.into_string();
        assert!(src.contains("pub struct UnaryServiceClient<T: protobuf_rpc::Transport>"));
        assert!(src.contains("pub fn ping(&mut self, req: &Req) -> protobuf_rpc::RpcResult<Resp>"));
        assert!(src.contains("pub trait UnaryServiceHandler"));
        assert!(src.contains("fn ping(&mut self, req: Req) -> protobuf_rpc::RpcResult<Resp>;"));
        assert!(src.contains("pub struct UnaryServiceServer<H: UnaryServiceHandler>"));
        assert!(src.contains("\"/UnaryService/Ping\" => {"));
    }

    #[test]
    fn server_streaming_client_method_returns_recv_stream() {
        let svc = packaged_streaming_service();
        let mut w = CodeWriter::new();
        generate_service(&mut w, &svc, Some("demo"), &Customize::default());
        let src = w.into_string();
        assert!(src.contains("protobuf_rpc::RpcResult<protobuf_rpc::RecvStream<'_, T, Resp>>"));
        assert!(src.contains("let mut out = protobuf_rpc::SendStream::new(transport);"));
    }
}
