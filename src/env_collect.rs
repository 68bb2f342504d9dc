//! Collects the environment variables configured on every Lambda function of a
//! CloudFormation stack, descending into nested stacks.

use std::{collections::BTreeMap, future::Future, pin::Pin, sync::Arc};

use backend::{AwsStackBackend, StackBackend, StackResource};
use fractic_server_error::ServerError;
use tracing::{debug, info, warn};

use crate::{
    config::{AwsTarget, CollectEnvArgs},
    errors::{CloudFormationCalloutError, InvalidNestedStackId, LambdaCalloutError},
};

pub mod backend;
pub mod output;

pub const NESTED_STACK_RESOURCE_TYPE: &str = "AWS::CloudFormation::Stack";
pub const LAMBDA_FUNCTION_RESOURCE_TYPE: &str = "AWS::Lambda::Function";

pub type EnvVariables = BTreeMap<String, String>;

/// Accumulator threaded through the stack walk.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EnvCollection {
    /// Variables of all functions. On key collisions, the function visited
    /// last wins (listing order, depth-first through nested stacks).
    pub merged: EnvVariables,
    /// Variables per function logical ID, per stack, in the order the stacks
    /// completed. Stacks without any function variables are left out.
    pub stacks: Vec<(String, BTreeMap<String, EnvVariables>)>,
    /// Number of Lambda functions visited so far.
    pub function_count: usize,
}

/// Extracts the child stack name from a nested stack's physical ID, which has
/// the form `arn:aws:cloudformation:<region>:<account>:stack/<name>/<id>`.
pub fn nested_stack_name(physical_id: &str) -> Result<&str, ServerError> {
    physical_id
        .split('/')
        .nth(1)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| InvalidNestedStackId::new(physical_id))
}

type WalkFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ServerError>> + Send + 'a>>;

#[derive(Clone)]
pub struct EnvCollector {
    pub backend: Arc<dyn StackBackend>,
}

impl EnvCollector {
    pub fn new(backend: Arc<dyn StackBackend>) -> Self {
        Self { backend }
    }

    /// Walks `stack_name` and all of its nested stacks, one resource at a time.
    pub async fn collect(&self, stack_name: &str) -> Result<EnvCollection, ServerError> {
        let mut collection = EnvCollection::default();
        self.walk_stack(stack_name.to_string(), &mut collection).await?;
        Ok(collection)
    }

    fn walk_stack<'a>(
        &'a self,
        stack_name: String,
        acc: &'a mut EnvCollection,
    ) -> WalkFuture<'a> {
        Box::pin(async move {
            let mut stack_functions: BTreeMap<String, EnvVariables> = BTreeMap::new();
            let mut next_token = None;
            loop {
                let page = self
                    .backend
                    .list_stack_resources(stack_name.clone(), next_token)
                    .await
                    .map_err(|e| CloudFormationCalloutError::with_debug(&e))?;
                for resource in &page.resources {
                    self.visit_resource(resource, &mut stack_functions, acc).await?;
                }
                next_token = page.next_token;
                if next_token.is_none() {
                    break;
                }
            }

            info!(
                stack = %stack_name,
                functions = acc.function_count,
                "functions collected so far"
            );
            if !stack_functions.is_empty() {
                debug!(
                    stack = %stack_name,
                    functions = ?stack_functions.keys(),
                    "stack variables"
                );
                acc.stacks.push((stack_name.clone(), stack_functions));
            }
            info!(stack = %stack_name, "stack completed");
            Ok(())
        })
    }

    async fn visit_resource(
        &self,
        resource: &StackResource,
        stack_functions: &mut BTreeMap<String, EnvVariables>,
        acc: &mut EnvCollection,
    ) -> Result<(), ServerError> {
        let is_nested_stack = resource.resource_type == NESTED_STACK_RESOURCE_TYPE;
        let is_function = resource.resource_type == LAMBDA_FUNCTION_RESOURCE_TYPE;
        if !is_nested_stack && !is_function {
            return Ok(());
        }
        let Some(physical_id) = resource.physical_id.as_deref() else {
            warn!(
                resource = %resource.logical_id,
                resource_type = %resource.resource_type,
                "resource has no physical ID, skipping"
            );
            return Ok(());
        };

        if is_nested_stack {
            let child = nested_stack_name(physical_id)?;
            debug!(resource = %resource.logical_id, child, "descending into nested stack");
            return self.walk_stack(child.to_string(), acc).await;
        }

        let config = self
            .backend
            .get_function_configuration(physical_id.to_string())
            .await
            .map_err(|e| LambdaCalloutError::with_debug(&e))?;
        acc.function_count += 1;
        if let Some(variables) = config.environment().and_then(|env| env.variables()) {
            let variables: EnvVariables = variables
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            acc.merged.extend(variables.clone());
            stack_functions.insert(resource.logical_id.clone(), variables);
        }
        Ok(())
    }
}

/// Collects the variables of `args.stack_name`, writes them to the output file
/// if one was given, and returns the rendered parameters document.
pub async fn run(args: CollectEnvArgs) -> Result<String, ServerError> {
    info!(stack = %args.stack_name, "collecting lambda environment variables");
    let backend = AwsStackBackend::new(&AwsTarget::default()).await;
    let collection = EnvCollector::new(Arc::new(backend))
        .collect(&args.stack_name)
        .await?;
    info!(
        functions = collection.function_count,
        variables = collection.merged.len(),
        "collection complete"
    );

    let document = output::render_parameters(&collection.merged)?;
    if let Some(path) = &args.output_file_path {
        output::write_parameters_file(path, &document).await?;
        info!(path = %path.display(), "wrote parameters file");
    }
    Ok(document)
}
