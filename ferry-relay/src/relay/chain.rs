use std::sync::Arc;

use super::client::Client;

/// 客户端包装器
///
/// 接受内层客户端，返回包装后的客户端
pub type Wrapper = Box<dyn Fn(Arc<dyn Client>) -> Arc<dyn Client> + Send + Sync>;

/// 按顺序应用包装器，列表中的第一个包装器位于最外层
pub fn wrap(client: Arc<dyn Client>, wrappers: &[Wrapper]) -> Arc<dyn Client> {
    wrappers
        .iter()
        .rev()
        .fold(client, |inner, wrapper| wrapper(inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::client::{CallOptions, ClientError, Request, Response};
    use async_trait::async_trait;
    use ferry_core::CallContext;
    use parking_lot::Mutex;

    /// 记录进入顺序的包装器
    struct Tagging {
        tag: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        inner: Arc<dyn Client>,
    }

    #[async_trait]
    impl Client for Tagging {
        async fn call(
            &self,
            ctx: &CallContext,
            request: &Request,
            opts: CallOptions,
        ) -> Result<Response, ClientError> {
            self.log.lock().push(self.tag);
            self.inner.call(ctx, request, opts).await
        }
    }

    fn tagging(tag: &'static str, log: Arc<Mutex<Vec<&'static str>>>) -> Wrapper {
        Box::new(move |inner: Arc<dyn Client>| -> Arc<dyn Client> {
            Arc::new(Tagging {
                tag,
                log: log.clone(),
                inner,
            })
        })
    }

    #[tokio::test]
    async fn test_first_wrapper_is_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let base = Arc::new(crate::relay::testing::RecordingClient::new());
        let client = wrap(
            base.clone(),
            &[
                tagging("outer", log.clone()),
                tagging("middle", log.clone()),
                tagging("inner", log.clone()),
            ],
        );

        client
            .call(
                &CallContext::new(),
                &Request::new("greeter", "Say.Hello"),
                CallOptions::new(),
            )
            .await
            .unwrap();

        assert_eq!(*log.lock(), vec!["outer", "middle", "inner"]);
        assert_eq!(base.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_chain_returns_base_client() {
        let base = Arc::new(crate::relay::testing::RecordingClient::new());
        let client = wrap(base.clone(), &[]);
        client
            .call(
                &CallContext::new(),
                &Request::new("greeter", "Say.Hello"),
                CallOptions::new(),
            )
            .await
            .unwrap();
        assert_eq!(base.calls().len(), 1);
    }
}
